//! Engine - the fixed-timestep scheduler.
//!
//! Owns the grid, the element table, the RNG state and the compositor. A
//! frame tick applies pending input, runs zero or more physics steps out of
//! the accumulated wall-clock debt, then composites a frame. A physics step
//! consumes the previous tick's dirty set: shuffle, bottom-up stable sort,
//! per-category dispatch behind a processed-set guard, then one liquid
//! grouping and equalisation pass.

use std::sync::Arc;

use crate::behaviors::{BehaviorRegistry, UpdateContext};
use crate::core::color::Rgba;
use crate::core::rng::{seed_nonzero, shuffle};
use crate::domain::element::{ElementId, EMPTY};
use crate::domain::registry::ElementRegistry;
use crate::domain::settings::Settings;
use crate::grid::{Grid, IndexSet};
use crate::render::{circle_outline, Compositor, OverlayPixel};
use crate::simulation::equalise::{collect_equalisation_groups, equalise};
use crate::simulation::input::{InputEvent, PointerState};

/// Hard ceiling on physics catch-up inside one frame. Hitting it drops the
/// remaining time debt instead of spiraling.
pub const MAX_SUBSTEPS_PER_FRAME: u32 = 60;

const DEFAULT_SEED: u32 = 12345;

/// Tint for cells the debug overlay highlights as active.
const DEBUG_OVERLAY_COLOR: Rgba = Rgba::new(255, 64, 160, 96);

/// Events-per-second meter over a rolling one-second window.
struct RateMeter {
    window_start: Option<f64>,
    count: u32,
    value: f64,
}

impl RateMeter {
    fn new() -> RateMeter {
        RateMeter {
            window_start: None,
            count: 0,
            value: 0.0,
        }
    }

    fn record(&mut self, now_ms: f64, events: u32) {
        let start = *self.window_start.get_or_insert(now_ms);
        self.count += events;
        let elapsed = now_ms - start;
        if elapsed >= 1000.0 {
            self.value = self.count as f64 * 1000.0 / elapsed;
            self.count = 0;
            self.window_start = Some(now_ms);
        }
    }
}

pub struct Engine {
    grid: Grid,
    elements: Arc<ElementRegistry>,
    behaviors: BehaviorRegistry,
    compositor: Compositor,
    settings: Settings,

    // clock
    last_frame_time: Option<f64>,
    accumulator: f64,
    tick_count: u64,
    is_running: bool,

    // stepping state
    rng_state: u32,
    processed: IndexSet,
    step_list: Vec<usize>,
    dirty_clear_cadence: u64,

    // input
    events: Vec<InputEvent>,
    pointer: PointerState,
    selected_element: ElementId,
    brush_size: f64,

    // debug
    debug_enabled: bool,
    overlay_enabled: bool,

    fps: RateMeter,
    tps: RateMeter,
}

impl Engine {
    pub fn new(settings: Settings, elements: ElementRegistry) -> Engine {
        Engine::with_seed(settings, elements, DEFAULT_SEED)
    }

    /// Construct with an explicit RNG seed for reproducible runs.
    pub fn with_seed(settings: Settings, elements: ElementRegistry, seed: u32) -> Engine {
        let elements = Arc::new(elements);
        let grid = Grid::new(settings.width, settings.height, Arc::clone(&elements));
        let compositor = Compositor::new(settings.width, settings.height);
        let size = grid.size();

        let mut engine = Engine {
            grid,
            elements,
            behaviors: BehaviorRegistry::new(),
            compositor,
            last_frame_time: None,
            accumulator: 0.0,
            tick_count: 0,
            is_running: false,
            rng_state: seed_nonzero(seed),
            processed: IndexSet::new(size),
            step_list: Vec::new(),
            dirty_clear_cadence: 1,
            events: Vec::new(),
            pointer: PointerState::new(),
            selected_element: EMPTY,
            brush_size: settings.brush_size as f64,
            debug_enabled: settings.debug_start_enabled,
            overlay_enabled: settings.overlay_start_enabled,
            fps: RateMeter::new(),
            tps: RateMeter::new(),
            settings,
        };

        // default palette pick: the first paintable element, if any
        engine.selected_element = engine
            .elements
            .iter()
            .map(|el| el.id)
            .find(|&id| id != EMPTY)
            .unwrap_or(EMPTY);

        engine.queue_full_repaint();
        engine.compose_frame();
        engine
    }

    // === Lifecycle ===

    pub fn start(&mut self) {
        self.is_running = true;
        // stale clock would register as a huge catch-up frame
        self.last_frame_time = None;
        self.accumulator = 0.0;
    }

    pub fn stop(&mut self) {
        self.is_running = false;
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    /// Wipe the world back to air.
    pub fn clear(&mut self) {
        self.grid.reset();
        self.queue_full_repaint();
    }

    // === One frame ===

    /// Advance by wall-clock time. `now_ms` comes from the embedder's
    /// monotonic clock; physics runs in fixed `physics_interval` steps out
    /// of the accumulated debt, capped per frame.
    pub fn tick(&mut self, now_ms: f64) {
        if !self.is_running {
            return;
        }
        let dt = self
            .last_frame_time
            .map_or(0.0, |last| (now_ms - last).max(0.0));
        self.last_frame_time = Some(now_ms);

        self.apply_input();

        self.accumulator += dt;
        let mut substeps = 0;
        while self.accumulator >= self.settings.physics_interval {
            self.physics_step();
            self.accumulator -= self.settings.physics_interval;
            self.tick_count += 1;
            substeps += 1;
            if substeps >= MAX_SUBSTEPS_PER_FRAME {
                // catastrophic lag: drop the debt rather than spiral
                self.accumulator = 0.0;
                break;
            }
        }
        self.tps.record(now_ms, substeps);

        self.compose_frame();
        self.fps.record(now_ms, 1);
    }

    /// One physics step over the previous tick's dirty set.
    fn physics_step(&mut self) {
        self.step_list.clear();
        self.step_list.extend(self.grid.dirty().iter());
        if self.dirty_clear_cadence <= 1 || self.tick_count % self.dirty_clear_cadence == 0 {
            self.grid.clear_dirty();
        }
        if self.step_list.is_empty() {
            return;
        }

        // random visit order, then bottom row first; the stable sort keeps
        // the shuffled order within a row
        shuffle(&mut self.rng_state, &mut self.step_list);
        let width = self.grid.width() as usize;
        self.step_list.sort_by_key(|index| index / width);

        self.processed.clear();
        for i in 0..self.step_list.len() {
            let index = self.step_list[i];
            if self.processed.contains(index) {
                continue;
            }
            let category = self.grid.cell(index).category;
            let mut ctx = UpdateContext {
                grid: &mut self.grid,
                elements: &self.elements,
                index,
                rng: &mut self.rng_state,
            };
            if let Some(new_index) = self.behaviors.update(category, &mut ctx) {
                self.processed.insert(index);
                self.processed.insert(new_index);
            }
        }

        let mut groups = collect_equalisation_groups(&self.grid);
        equalise(&mut self.grid, &mut groups, &mut self.processed);

        self.queue_dirty_repaint();
    }

    // === Painting ===

    /// Paint a disc of `element`. Non-zero elements only fill air; id 0
    /// erases unconditionally.
    pub fn paint_circle(&mut self, cx: i32, cy: i32, radius: i32, element: ElementId) {
        if !self.elements.contains(element) {
            log::warn!("paint: unknown element id {}", element);
            return;
        }
        self.grid
            .fill_circle(cx, cy, radius, element, &mut self.rng_state);

        // repaint the touched disc
        let r = radius.max(0);
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy > r * r {
                    continue;
                }
                if let Some(p) = self.grid.get(cx + dx, cy + dy) {
                    let index = p.index;
                    self.compositor
                        .queue_particles([self.grid.cell(index)], None);
                }
            }
        }
    }

    pub fn erase_circle(&mut self, cx: i32, cy: i32, radius: i32) {
        self.paint_circle(cx, cy, radius, EMPTY);
    }

    // === Input ===

    pub fn push_input(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    fn apply_input(&mut self) {
        let events = std::mem::take(&mut self.events);
        for event in events {
            if let InputEvent::Wheel { delta } = event {
                let next = self.brush_size + delta * self.settings.brush_sensitivity;
                self.brush_size = next.clamp(0.0, self.settings.brush_max_size as f64);
            }
            self.pointer.apply(event);
        }

        if let Some((x, y)) = self.pointer.cursor {
            // erase wins when both buttons are held
            if self.pointer.erasing {
                self.erase_circle(x, y, self.brush_radius());
            } else if self.pointer.painting {
                self.paint_circle(x, y, self.brush_radius(), self.selected_element);
            }
        }
    }

    pub fn set_selected_element(&mut self, element: ElementId) {
        if self.elements.contains(element) {
            self.selected_element = element;
        } else {
            log::warn!("select: unknown element id {}", element);
        }
    }

    pub fn selected_element(&self) -> ElementId {
        self.selected_element
    }

    pub fn set_brush_size(&mut self, size: u32) {
        self.brush_size = (size.min(self.settings.brush_max_size)) as f64;
    }

    pub fn brush_radius(&self) -> i32 {
        self.brush_size.round() as i32
    }

    // === Rendering ===

    fn compose_frame(&mut self) {
        let outline = match self.pointer.cursor {
            Some((x, y)) if self.grid.in_bounds(x, y) => circle_outline(
                x,
                y,
                self.brush_radius(),
                self.grid.width(),
                self.grid.height(),
            ),
            _ => Vec::new(),
        };
        self.compositor.set_ui_pixels(outline);
        self.compositor.render();
    }

    fn queue_full_repaint(&mut self) {
        self.compositor
            .queue_particles(self.grid.cells().iter(), None);
    }

    fn queue_dirty_repaint(&mut self) {
        let debug = self.overlay_enabled.then_some(DEBUG_OVERLAY_COLOR);
        let grid = &self.grid;
        self.compositor
            .queue_particles(grid.dirty().iter().map(|index| grid.cell(index)), debug);
    }

    /// Blend arbitrary pixels over the next frames until drained.
    pub fn queue_overlay_pixels(&mut self, pixels: &[OverlayPixel]) {
        self.compositor.queue_overlay_pixels(pixels);
    }

    /// The last composed frame: top-left-origin RGBA8, `W*H*4` bytes.
    pub fn take_frame(&self) -> &[u8] {
        self.compositor.frame()
    }

    // === Introspection ===

    pub fn width(&self) -> u32 {
        self.grid.width() as u32
    }

    pub fn height(&self) -> u32 {
        self.grid.height() as u32
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn elements(&self) -> &ElementRegistry {
        &self.elements
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn particle_count(&self) -> u32 {
        self.grid.particle_count()
    }

    pub fn fps(&self) -> f64 {
        self.fps.value
    }

    pub fn tps(&self) -> f64 {
        self.tps.value
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug_enabled
    }

    pub fn set_debug_enabled(&mut self, enabled: bool) {
        self.debug_enabled = enabled;
    }

    pub fn set_overlay_enabled(&mut self, enabled: bool) {
        self.overlay_enabled = enabled;
    }

    /// How often the dirty set is dropped, in ticks. 1 clears every step;
    /// larger values keep quiet regions under evaluation longer at extra
    /// cost.
    pub fn set_dirty_clear_cadence(&mut self, ticks: u64) {
        self.dirty_clear_cadence = ticks.max(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::input::PointerButton;
    use crate::testutil::{test_registry, test_settings};

    const SAND: ElementId = 10;
    const WATER: ElementId = 11;

    fn engine(w: u32, h: u32) -> Engine {
        let mut engine = Engine::with_seed(test_settings(w, h), test_registry(), 77);
        engine.start();
        engine
    }

    /// Run `n` physics steps by feeding the clock one interval at a time.
    fn run_steps(engine: &mut Engine, n: u64) {
        engine.start(); // re-prime the clock: the first tick has dt = 0
        let dt = engine.settings().physics_interval;
        let base = engine.tick_count();
        engine.tick(0.0);
        for i in 1..=n {
            engine.tick(i as f64 * dt);
        }
        assert_eq!(engine.tick_count(), base + n);
    }

    #[test]
    fn stopped_engine_ignores_ticks() {
        let mut e = engine(10, 10);
        e.stop();
        e.tick(0.0);
        e.tick(1000.0);
        assert_eq!(e.tick_count(), 0);
    }

    #[test]
    fn accumulator_runs_fixed_steps() {
        let mut e = engine(10, 10);
        e.tick(0.0); // primes the clock, dt = 0
        assert_eq!(e.tick_count(), 0);
        e.tick(100.0); // 100ms at 25ms steps
        assert_eq!(e.tick_count(), 4);
        e.tick(110.0);
        assert_eq!(e.tick_count(), 4); // only 10ms of debt
        e.tick(125.0);
        assert_eq!(e.tick_count(), 5);
    }

    #[test]
    fn substep_cap_drops_the_debt() {
        let mut e = engine(10, 10);
        e.tick(0.0);
        // an hour of debt caps at MAX_SUBSTEPS_PER_FRAME steps
        e.tick(3_600_000.0);
        assert_eq!(e.tick_count(), MAX_SUBSTEPS_PER_FRAME as u64);
        // and the debt is gone: the next small dt yields one step
        e.tick(3_600_025.0);
        assert_eq!(e.tick_count(), MAX_SUBSTEPS_PER_FRAME as u64 + 1);
    }

    #[test]
    fn quiet_world_is_a_no_op() {
        let mut e = engine(10, 10);
        run_steps(&mut e, 5);
        assert_eq!(e.particle_count(), 0);
        assert!(e.grid().dirty().is_empty());
    }

    #[test]
    fn sand_row_falls_to_the_floor_and_is_conserved() {
        let mut e = engine(20, 20);
        for x in 5..15 {
            e.paint_circle(x, 15, 0, SAND);
        }
        assert_eq!(e.particle_count(), 10);

        run_steps(&mut e, 200);

        let grid = e.grid();
        let sand: Vec<_> = (0..grid.size())
            .filter(|&i| grid.cell(i).element == SAND)
            .collect();
        assert_eq!(sand.len(), 10, "sand is conserved");
        // a 1-tall row free-falls straight down onto the floor
        for &i in &sand {
            assert_eq!(grid.cell(i).y, 0);
            assert!((5..15).contains(&grid.cell(i).x));
        }
    }

    #[test]
    fn sand_column_settles_within_the_repose_slope() {
        let mut e = engine(20, 20);
        // a tall thin column collapses into a mound
        for y in 5..15 {
            e.paint_circle(10, y, 0, SAND);
        }
        run_steps(&mut e, 300);

        let grid = e.grid();
        let mut heights = [0i32; 20];
        for i in 0..grid.size() {
            let p = grid.cell(i);
            if p.element == SAND {
                heights[p.x as usize] += 1;
            }
        }
        assert_eq!(heights.iter().sum::<i32>(), 10);
        // at 45 degrees of repose, neighboring columns differ by at most one
        for x in 0..19 {
            assert!(
                (heights[x] - heights[x + 1]).abs() <= 1,
                "cliff between columns {} and {}: {:?}",
                x,
                x + 1,
                heights
            );
        }
    }

    #[test]
    fn water_descends_monotonically_to_the_floor() {
        let mut e = engine(10, 10);
        e.paint_circle(5, 9, 0, WATER);

        let dt = e.settings().physics_interval;
        e.tick(0.0);
        // nine steps of free fall, one cell per step, straight down
        for step in 1..=9 {
            e.tick(step as f64 * dt);
            let grid = e.grid();
            let water = (0..grid.size())
                .find(|&i| grid.cell(i).element == WATER)
                .map(|i| grid.cell(i))
                .expect("water is conserved");
            assert_eq!(water.x, 5, "nothing to flow around in an empty column");
            assert_eq!(water.y, 9 - step, "one cell per step");
        }
        // on the floor it may only flow sideways, never back up
        for step in 10..=20 {
            e.tick(step as f64 * dt);
            let grid = e.grid();
            let water = (0..grid.size())
                .find(|&i| grid.cell(i).element == WATER)
                .map(|i| grid.cell(i))
                .expect("water is conserved");
            assert_eq!(water.y, 0);
        }
    }

    #[test]
    fn painting_an_unknown_element_is_refused() {
        let mut e = engine(10, 10);
        e.paint_circle(5, 5, 2, 999);
        assert_eq!(e.particle_count(), 0);
    }

    #[test]
    fn erasing_twice_equals_erasing_once() {
        let mut e = engine(16, 16);
        e.paint_circle(8, 8, 3, SAND);
        let painted = e.particle_count();
        assert!(painted > 0);

        e.erase_circle(8, 8, 4);
        let after_once: Vec<ElementId> = (0..e.grid().size())
            .map(|i| e.grid().cell(i).element)
            .collect();
        assert_eq!(e.particle_count(), 0);

        e.erase_circle(8, 8, 4);
        let after_twice: Vec<ElementId> = (0..e.grid().size())
            .map(|i| e.grid().cell(i).element)
            .collect();
        assert_eq!(after_once, after_twice);
    }

    #[test]
    fn pointer_input_paints_with_the_selected_element() {
        let mut e = engine(16, 16);
        e.set_selected_element(WATER);
        e.set_brush_size(0);
        e.push_input(InputEvent::PointerDown {
            button: PointerButton::Primary,
            x: 8,
            y: 12,
        });
        e.tick(0.0);
        assert_eq!(e.grid().get(8, 12).unwrap().element, WATER);

        // held pointer keeps painting at the cursor as it moves
        e.push_input(InputEvent::PointerMove { x: 9, y: 12 });
        e.tick(5.0);
        assert_eq!(e.grid().get(9, 12).unwrap().element, WATER);

        e.push_input(InputEvent::PointerUp {
            button: PointerButton::Primary,
        });
        e.push_input(InputEvent::PointerMove { x: 10, y: 12 });
        e.tick(10.0);
        assert!(e.grid().get(10, 12).unwrap().is_empty());
    }

    #[test]
    fn wheel_scales_the_brush_within_limits() {
        let mut e = engine(16, 16);
        assert_eq!(e.brush_radius(), 4);

        e.push_input(InputEvent::Wheel { delta: 100.0 });
        e.tick(0.0);
        assert_eq!(e.brush_radius(), 6); // 4 + 100 * 0.02

        e.push_input(InputEvent::Wheel { delta: 1e9 });
        e.tick(5.0);
        assert_eq!(e.brush_radius(), 42); // clamped to brush_max_size

        e.push_input(InputEvent::Wheel { delta: -1e9 });
        e.tick(10.0);
        assert_eq!(e.brush_radius(), 0);
    }

    #[test]
    fn frame_is_sized_and_background_colored() {
        let e = engine(8, 6);
        let frame = e.take_frame();
        assert_eq!(frame.len(), 8 * 6 * 4);
        // air background everywhere
        assert_eq!(&frame[0..4], &[0x0E, 0x0E, 0x11, 0xFF]);
        let last = frame.len() - 4;
        assert_eq!(&frame[last..], &[0x0E, 0x0E, 0x11, 0xFF]);
    }

    #[test]
    fn painted_cells_show_up_y_flipped_in_the_frame() {
        let mut e = engine(8, 8);
        e.paint_circle(2, 0, 0, SAND); // bottom row in sim space
        e.tick(0.0);
        let frame = e.take_frame();
        // image row 7, column 2
        let offset = (7 * 8 + 2) * 4;
        let sand = e.grid().get(2, 0).unwrap().color;
        assert_eq!(&frame[offset..offset + 4], &[sand.r, sand.g, sand.b, sand.a]);
    }

    #[test]
    fn moved_particles_repaint_without_stale_pixels() {
        let mut e = engine(8, 8);
        e.paint_circle(3, 5, 0, SAND);
        e.tick(0.0);
        e.tick(25.0); // one step: the grain falls one cell
        let frame = e.take_frame();
        let image_offset = |x: usize, y_sim: usize| ((7 - y_sim) * 8 + x) * 4;
        // vacated cell is air again
        assert_eq!(frame[image_offset(3, 5)], 0x0E);
        // the grain is one row lower
        let sand = e.grid().get(3, 4).unwrap();
        assert_eq!(sand.element, SAND);
        assert_eq!(frame[image_offset(3, 4)], sand.color.r);
    }

    #[test]
    fn cursor_outline_appears_only_while_on_canvas() {
        let mut e = engine(16, 16);
        let clean = e.take_frame().to_vec();

        e.set_brush_size(3);
        e.push_input(InputEvent::PointerMove { x: 8, y: 8 });
        e.tick(0.0);
        assert_ne!(e.take_frame(), &clean[..], "outline pixels were blended");

        e.push_input(InputEvent::PointerMove { x: -5, y: 8 });
        e.tick(5.0);
        assert_eq!(e.take_frame(), &clean[..], "off-canvas cursor draws nothing");
    }

    #[test]
    fn debug_overlay_tints_active_cells() {
        let settings = Settings {
            overlay_start_enabled: true,
            ..test_settings(8, 8)
        };
        let mut e = Engine::with_seed(settings, test_registry(), 77);
        e.start();
        e.paint_circle(3, 5, 0, SAND);
        e.tick(0.0);
        e.tick(25.0); // one step: the grain moves and gets tinted

        let sand = e.grid().get(3, 4).unwrap();
        let offset = ((7 - 4) * 8 + 3) * 4;
        let frame = e.take_frame();
        assert_ne!(
            &frame[offset..offset + 4],
            &[sand.color.r, sand.color.g, sand.color.b, sand.color.a],
            "the overlay tint must blend over the raw particle color"
        );
    }

    #[test]
    fn overlay_pixels_blend_for_one_frame() {
        let mut e = engine(8, 8);
        let clean = e.take_frame().to_vec();

        e.queue_overlay_pixels(&[OverlayPixel {
            index: 0,
            color: Rgba::new(255, 0, 0, 255),
        }]);
        e.tick(0.0);
        assert_eq!(&e.take_frame()[0..3], &[255, 0, 0]);

        e.tick(5.0); // drained: back to the base image
        assert_eq!(e.take_frame(), &clean[..]);
    }

    #[test]
    fn clear_resets_the_world_and_counters() {
        let mut e = engine(12, 12);
        e.paint_circle(6, 6, 3, SAND);
        run_steps(&mut e, 3);
        assert!(e.particle_count() > 0);

        e.clear();
        e.tick(1_000_000.0);
        assert_eq!(e.particle_count(), 0);
        assert!(e.grid().cells().iter().all(|p| p.is_empty()));
    }
}
