//! One level session: everything that lives from entering a level until leaving it.

use crate::classify::{Destination, NavigationBinding, RuleSet};
use crate::config::GameConfig;
use crate::level::{bridge_bounds, LevelKind, LevelSpec, ModelRole, FLOOR1_POSITION};
use crate::loading::LoadingScreen;
use crate::navigation::{NavigationDispatcher, NavigationEffect};
use crate::overlay::{OverlayContent, OverlayPage, OverlayState, STEP_COUNT};
use crate::player::PlayerController;
use crate::registry::InteractionRegistry;
use crate::selector::RaycastSelector;
use crate::storage::DurableStore;
use engine_core::{Ray, SceneName, SimulationClock};
use hecs::World;
use input::InputState;
use physics::PhysicsWorld;
use scene::{AssetLoaded, AssetLoader, AssetRequest, SceneGraph};

/// What the app should do after a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionOutcome {
    Continue,
    /// Leave this level for a page.
    Navigate(Destination),
    /// Leave for another in-app level.
    Enter(LevelKind),
    /// Storage was cleared; start the level again.
    Reload,
}

/// Per-frame facts the session needs from the window.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    pub dt: f64,
    pub input: &'a InputState,
    pub viewport: (u32, u32),
}

pub struct LevelSession {
    spec: LevelSpec,
    world: World,
    physics: PhysicsWorld,
    registry: InteractionRegistry,
    selector: RaycastSelector,
    navigator: NavigationDispatcher,
    overlay: OverlayState,
    overlay_content: OverlayContent,
    /// Overlay page currently on screen.
    shown: Option<(u8, OverlayPage)>,
    player: PlayerController,
    clock: SimulationClock,
    loading: LoadingScreen,
    loader: Option<AssetLoader>,
    loaded: Vec<ModelRole>,
}

impl LevelSession {
    /// Enter `kind` and start loading its models in the background.
    pub fn start(kind: LevelKind, config: &GameConfig, store: &DurableStore) -> Self {
        let spec = kind.spec();
        let requests = spec
            .models
            .iter()
            .enumerate()
            .map(|(slot, model)| AssetRequest {
                slot,
                path: config.asset_dir.join(model.file),
                position: model.position,
            })
            .collect();

        let mut session = Self::empty(spec, config);
        session.loading.show();
        session.loader = Some(AssetLoader::spawn(requests));

        if session.spec.resume_from_storage {
            if let Some(view) = store.load_view() {
                log::info!("Resuming at {}", view.position);
                session.player.restore_view(&view);
            }
        }
        session
    }

    /// Session with no models and nothing loading.
    pub fn empty(spec: LevelSpec, config: &GameConfig) -> Self {
        let mut physics = PhysicsWorld::new(spec.gravity);
        physics.add_ground_plane();
        physics.update_query_pipeline();

        let mut player = PlayerController::new(spec.spawn, config.sensitivity, config.move_speed);
        player.camera.set_aspect(config.window_width, config.window_height);

        log::info!("Entering {}", spec.title);
        Self {
            spec,
            world: World::new(),
            physics,
            registry: InteractionRegistry::new(),
            selector: RaycastSelector::new(),
            navigator: NavigationDispatcher::new(),
            overlay: OverlayState::new(),
            overlay_content: OverlayContent::new(&config.overlay_dir),
            shown: None,
            player,
            clock: SimulationClock::new(config.fixed_timestep, config.max_frame_delta),
            loading: LoadingScreen::default(),
            loader: None,
            loaded: Vec::new(),
        }
    }

    /// Run one frame: load results, fixed steps, hover, then input actions.
    pub fn frame(&mut self, ctx: FrameContext<'_>, store: &mut DurableStore) -> SessionOutcome {
        self.poll_loader();

        self.player.handle_input(ctx.input);
        let steps = self.clock.advance(ctx.dt);
        let h = self.clock.fixed_step() as f32;
        for _ in 0..steps {
            self.physics.step(h);
            self.player.update(&self.physics, h);
        }
        self.loading.advance(clamped_frame_delta(ctx.dt, self.clock.max_frame_delta()));

        let ray = self.view_ray(ctx);
        let candidate = self.registry.pick(&self.physics, &ray);
        self.selector.update(&mut self.world, candidate);

        let outcome = self.handle_actions(ctx.input, store);
        self.navigator.settle(self.overlay.is_open());
        self.present_overlay();
        outcome
    }

    fn view_ray(&self, ctx: FrameContext<'_>) -> Ray {
        if ctx.input.is_cursor_locked() {
            self.player.camera.center_ray()
        } else {
            let (w, h) = ctx.viewport;
            self.player.camera.ndc_ray(ctx.input.pointer_ndc(w, h))
        }
    }

    fn handle_actions(&mut self, input: &InputState, store: &mut DurableStore) -> SessionOutcome {
        if input.is_refresh_pressed() {
            if let Err(e) = store.clear() {
                log::warn!("Could not clear storage: {}", e);
            }
            return SessionOutcome::Reload;
        }

        if input.is_close_pressed() && self.overlay.is_open() {
            self.overlay.close();
        }

        if input.is_back_pressed() {
            if let Some(level) = self.spec.return_to {
                log::info!("Returning to {}", level.spec().title);
                return SessionOutcome::Enter(level);
            }
        }

        if self.spec.has_overlay {
            if let Some(step) = input.digit_pressed().filter(|d| *d <= STEP_COUNT) {
                self.overlay.set_step(step);
            }
            if input.is_next_pressed() {
                self.overlay.next();
            }
            if input.is_previous_pressed() {
                self.overlay.previous();
            }
        }

        if !input.is_select_pressed() {
            return SessionOutcome::Continue;
        }
        let look_ready = input.is_cursor_locked() || !self.spec.requires_look_lock;
        match self.navigator.select(&self.world, self.selector.selected(), look_ready) {
            Some(NavigationEffect::Redirect(destination)) => {
                let position = self.player.position();
                if let Err(e) = store.save_view(position, self.player.look_at_point()) {
                    log::warn!("Could not save player view: {}", e);
                }
                SessionOutcome::Navigate(destination)
            }
            Some(NavigationEffect::Teleport(target)) => {
                self.player.teleport(target);
                SessionOutcome::Continue
            }
            Some(NavigationEffect::OpenOverlay) => {
                self.overlay.start();
                SessionOutcome::Continue
            }
            None => SessionOutcome::Continue,
        }
    }

    fn poll_loader(&mut self) {
        let Some(loader) = self.loader.as_mut() else {
            return;
        };
        let results = loader.poll();
        let finished = loader.is_finished();
        for loaded in results {
            self.integrate(loaded);
        }
        if finished {
            self.loader = None;
            self.finish_loading();
        }
    }

    fn integrate(&mut self, loaded: AssetLoaded) {
        let Some(placement) = self.spec.models.get(loaded.request.slot).cloned() else {
            return;
        };
        match loaded.result {
            Ok(graph) => {
                self.add_model(&graph, placement.rules);
                self.loaded.push(placement.role);
            }
            Err(e) => log::error!("Error loading model: {}", e),
        }
        if placement.role == ModelRole::Primary {
            self.loading.dismiss();
        }
    }

    /// Classify a loaded model into this session.
    pub fn add_model(&mut self, graph: &SceneGraph, rules: RuleSet) {
        self.registry
            .register_graph(&mut self.world, &mut self.physics, graph, rules);
    }

    /// Work that waits on every model: linking the upper floors.
    pub fn finish_loading(&mut self) {
        self.loading.dismiss();
        if !self.spec.links_upper_floors {
            return;
        }
        if !self.loaded.contains(&ModelRole::Floor1) || !self.loaded.contains(&ModelRole::Floor2) {
            log::warn!("Upper floors did not load; they stay unlinked");
            return;
        }
        self.physics.add_static_box(&bridge_bounds());
        if self
            .registry
            .bind_new_floors_door(&mut self.world, &mut self.physics, FLOOR1_POSITION)
            .is_none()
        {
            log::warn!("No spare door to link the upper floors");
        }
        self.physics.update_query_pipeline();
    }

    fn present_overlay(&mut self) {
        let step = self.overlay.step();
        if step == self.shown.as_ref().map(|(s, _)| *s) {
            return;
        }
        let Some(step) = step else {
            self.shown = None;
            log::info!("Overlay closed");
            return;
        };
        self.shown = self.overlay_content.page(step).map(|page| (step, page));
        match self.shown.as_ref().map(|(_, page)| page) {
            Some(OverlayPage::Image(path)) => log::info!("Overlay step {}: {:?}", step, path),
            Some(OverlayPage::Text(text)) => {
                log::info!("Overlay step {}: {}", step, text.title);
                for line in text.lines {
                    log::info!("  {}", line);
                }
            }
            None => {}
        }
    }

    /// One-line status for the window title.
    pub fn status_line(&self) -> String {
        let mut status = String::from(self.spec.title);
        if self.loading.is_visible() {
            status.push_str(&format!(" | Loading ({:.0}%)", self.loading.opacity() * 100.0));
        }
        if let Some((step, page)) = &self.shown {
            status.push_str(&format!(" | {} ({}/{})", page.title(), step, STEP_COUNT));
            if self.overlay.can_go_previous() {
                status.push_str(" <");
            }
            if self.overlay.can_go_next() {
                status.push_str(" >");
            }
        } else if let Some(hovered) = self.selector.hovered() {
            if let Ok(name) = self.world.get::<&SceneName>(hovered) {
                status.push_str(&format!(" | {}", name.as_str()));
            }
            if let Ok(binding) = self.world.get::<&NavigationBinding>(hovered) {
                status.push_str(&format!(" -> {}", describe(&binding)));
            }
        } else if self.spec.requires_look_lock {
            status.push_str(" | Enter to look around");
        } else if self.spec.return_to.is_some() {
            status.push_str(" | Backspace to go back");
        }
        status
    }

    pub fn kind(&self) -> LevelKind {
        self.spec.kind
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.player.camera.set_aspect(width, height);
    }
}

#[cfg(test)]
use crate::navigation::NavigationState;

#[cfg(test)]
impl LevelSession {
    pub fn player(&self) -> &PlayerController {
        &self.player
    }

    pub fn registry(&self) -> &InteractionRegistry {
        &self.registry
    }

    pub fn selector(&self) -> &RaycastSelector {
        &self.selector
    }

    pub fn overlay(&self) -> &OverlayState {
        &self.overlay
    }

    pub fn navigation_state(&self) -> NavigationState {
        self.navigator.state()
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn loading(&self) -> &LoadingScreen {
        &self.loading
    }

    pub fn is_loading(&self) -> bool {
        self.loader.is_some()
    }
}

fn clamped_frame_delta(dt: f64, max: f64) -> f32 {
    if dt.is_nan() || dt < 0.0 {
        0.0
    } else {
        dt.min(max) as f32
    }
}

fn describe(binding: &NavigationBinding) -> String {
    match binding {
        NavigationBinding::Redirect(destination) => destination.label().to_string(),
        NavigationBinding::Teleport(_) => "teleport".to_string(),
        NavigationBinding::Overlay => "walkthrough".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::{Aabb, Material, Vec3};
    use input::{ElementState, KeyCode, MouseButton};
    use scene::SceneMesh;

    fn config() -> GameConfig {
        GameConfig {
            overlay_dir: "/nonexistent/overlay".into(),
            ..Default::default()
        }
    }

    fn door(name: &str, center: Vec3) -> SceneMesh {
        SceneMesh::new(
            name,
            Aabb::from_center_size(center, Vec3::new(1.0, 2.0, 0.2)),
            Material::default(),
        )
    }

    fn locked() -> InputState {
        let mut input = InputState::new();
        input.set_cursor_locked(true);
        input
    }

    fn frame(session: &mut LevelSession, input: &InputState, store: &mut DurableStore) -> SessionOutcome {
        session.frame(
            FrameContext {
                dt: 1.0 / 60.0,
                input,
                viewport: (1280, 720),
            },
            store,
        )
    }

    fn main_dungeon_with(meshes: Vec<SceneMesh>) -> LevelSession {
        let mut session = LevelSession::empty(LevelKind::MainDungeon.spec(), &config());
        session.add_model(&SceneGraph::new("dungeon.glb", meshes), RuleSet::MainDungeon);
        session
    }

    #[test]
    fn fixed_steps_follow_frame_time() {
        let mut session = LevelSession::empty(LevelKind::MainDungeon.spec(), &config());
        let mut store = DurableStore::in_memory();
        let input = InputState::new();
        for _ in 0..3 {
            session.frame(FrameContext { dt: 0.02, input: &input, viewport: (800, 600) }, &mut store);
        }
        assert_eq!(session.clock().total_steps(), 3);
        assert!(session.clock().leftover() < session.clock().fixed_step());

        // NaN and lag spikes
        session.frame(FrameContext { dt: f64::NAN, input: &input, viewport: (800, 600) }, &mut store);
        assert_eq!(session.clock().total_steps(), 3);
        session.frame(FrameContext { dt: 5.0, input: &input, viewport: (800, 600) }, &mut store);
        assert_eq!(session.clock().total_steps(), 9);
    }

    #[test]
    fn clicking_an_algorithm_door_saves_view_and_navigates() {
        let mut session =
            main_dungeon_with(vec![door("wall_doorway_door_kruskal_ready", Vec3::new(0.0, 1.0, -5.0))]);
        let mut store = DurableStore::in_memory();

        let mut input = locked();
        frame(&mut session, &input, &mut store);
        assert!(session.selector().selected().is_some());

        input.process_mouse_button(MouseButton::Left, ElementState::Pressed);
        let outcome = frame(&mut session, &input, &mut store);
        assert_eq!(outcome, SessionOutcome::Navigate(Destination::Kruskal));

        let view = store.load_view().unwrap();
        assert_eq!(view.position, Vec3::new(0.0, 1.0, 0.0));
        assert!((view.look_at.unwrap() - Vec3::new(0.0, 1.0, -10.0)).length() < 1e-4);
    }

    #[test]
    fn main_dungeon_needs_look_lock_to_select() {
        let mut session =
            main_dungeon_with(vec![door("wall_doorway_door_prim_ready", Vec3::new(0.0, 1.0, -5.0))]);
        let mut store = DurableStore::in_memory();

        // Pointer at screen centre hovers the door without the lock
        let mut input = InputState::new();
        input.process_cursor_position((640.0, 360.0));
        frame(&mut session, &input, &mut store);
        assert!(session.selector().hovered().is_some());

        input.process_mouse_button(MouseButton::Left, ElementState::Pressed);
        assert_eq!(frame(&mut session, &input, &mut store), SessionOutcome::Continue);
        assert!(store.is_empty());
    }

    #[test]
    fn teleport_door_moves_the_player() {
        let mut session = main_dungeon_with(vec![door(
            "wall_doorway_door_treasure_left_ready",
            Vec3::new(0.0, 1.0, -5.0),
        )]);
        session
            .registry
            .bind_new_floors_door(&mut session.world, &mut session.physics, FLOOR1_POSITION)
            .unwrap();
        let mut store = DurableStore::in_memory();

        let mut input = locked();
        input.process_mouse_button(MouseButton::Left, ElementState::Pressed);
        assert_eq!(frame(&mut session, &input, &mut store), SessionOutcome::Continue);
        assert_eq!(session.player().position(), Vec3::new(52.0, 1.0, 2.0));
        assert_eq!(session.navigation_state(), NavigationState::Idle);
    }

    #[test]
    fn bucket_click_opens_overlay_without_lock() {
        let mut session = LevelSession::empty(LevelKind::BucketSortRoom.spec(), &config());
        session.add_model(
            &SceneGraph::new(
                "room.glb",
                vec![SceneMesh::new(
                    "bucket_1",
                    Aabb::from_center_size(Vec3::new(0.0, 1.0, 4.0), Vec3::ONE),
                    Material::default(),
                )],
            ),
            RuleSet::BucketSortRoom,
        );
        let mut store = DurableStore::in_memory();

        let mut input = InputState::new();
        input.process_cursor_position((640.0, 360.0));
        input.process_mouse_button(MouseButton::Left, ElementState::Pressed);
        frame(&mut session, &input, &mut store);
        assert_eq!(session.overlay().step(), Some(1));
        assert_eq!(session.navigation_state(), NavigationState::ShowingOverlayStep);

        let mut keys = InputState::new();
        keys.process_keyboard(KeyCode::Escape, ElementState::Pressed);
        frame(&mut session, &keys, &mut store);
        assert!(!session.overlay().is_open());
        assert_eq!(session.navigation_state(), NavigationState::Idle);
    }

    #[test]
    fn number_keys_and_arrows_drive_the_overlay() {
        let mut session = LevelSession::empty(LevelKind::BucketSortRoom.spec(), &config());
        let mut store = DurableStore::in_memory();

        let mut input = InputState::new();
        input.process_keyboard(KeyCode::Digit6, ElementState::Pressed);
        frame(&mut session, &input, &mut store);
        assert_eq!(session.overlay().step(), Some(6));

        input.begin_frame();
        input.process_keyboard(KeyCode::ArrowRight, ElementState::Pressed);
        frame(&mut session, &input, &mut store);
        assert_eq!(session.overlay().step(), Some(6));

        let mut back = InputState::new();
        back.process_keyboard(KeyCode::ArrowLeft, ElementState::Pressed);
        frame(&mut session, &back, &mut store);
        assert_eq!(session.overlay().step(), Some(5));
    }

    #[test]
    fn main_dungeon_ignores_overlay_keys() {
        let mut session = LevelSession::empty(LevelKind::MainDungeon.spec(), &config());
        let mut store = DurableStore::in_memory();
        let mut input = InputState::new();
        input.process_keyboard(KeyCode::Digit2, ElementState::Pressed);
        frame(&mut session, &input, &mut store);
        assert!(!session.overlay().is_open());
    }

    #[test]
    fn refresh_clears_storage_and_reloads() {
        let mut session = LevelSession::empty(LevelKind::MainDungeon.spec(), &config());
        let mut store = DurableStore::in_memory();
        store.save_view(Vec3::ONE, Vec3::ONE).unwrap();

        let mut input = InputState::new();
        input.process_keyboard(KeyCode::F5, ElementState::Pressed);
        assert_eq!(frame(&mut session, &input, &mut store), SessionOutcome::Reload);
        assert!(store.is_empty());
    }

    #[test]
    fn back_from_bucket_room_resumes_main_dungeon() {
        let mut store = DurableStore::in_memory();
        let mut dungeon =
            main_dungeon_with(vec![door("wall_doorway_door_bucketsort_ready", Vec3::new(0.0, 1.0, -5.0))]);
        let mut click = locked();
        click.process_mouse_button(MouseButton::Left, ElementState::Pressed);
        assert_eq!(
            frame(&mut dungeon, &click, &mut store),
            SessionOutcome::Navigate(Destination::BucketSort)
        );

        let mut room = LevelSession::empty(LevelKind::BucketSortRoom.spec(), &config());
        let mut back = InputState::new();
        back.process_keyboard(KeyCode::Backspace, ElementState::Pressed);
        let outcome = frame(&mut room, &back, &mut store);
        assert_eq!(outcome, SessionOutcome::Enter(LevelKind::MainDungeon));

        let resumed = LevelSession::start(LevelKind::MainDungeon, &config(), &store);
        assert_eq!(resumed.player().position(), Vec3::new(0.0, 1.0, 0.0));
        assert!((resumed.player().look_at_point() - Vec3::new(0.0, 1.0, -10.0)).length() < 1e-3);
    }

    #[test]
    fn main_dungeon_has_nowhere_to_go_back_to() {
        let mut session = LevelSession::empty(LevelKind::MainDungeon.spec(), &config());
        let mut store = DurableStore::in_memory();
        let mut back = InputState::new();
        back.process_keyboard(KeyCode::Backspace, ElementState::Pressed);
        assert_eq!(frame(&mut session, &back, &mut store), SessionOutcome::Continue);
    }

    #[test]
    fn resumes_from_saved_view() {
        let mut store = DurableStore::in_memory();
        store.save_view(Vec3::new(3.0, 1.0, -4.0), Vec3::new(3.0, 1.0, -14.0)).unwrap();
        let session = LevelSession::start(LevelKind::MainDungeon, &config(), &store);
        assert_eq!(session.player().position(), Vec3::new(3.0, 1.0, -4.0));
        assert!(session.loading().is_visible());

        let bucket_room = LevelSession::start(LevelKind::BucketSortRoom, &config(), &store);
        assert_eq!(bucket_room.player().position(), Vec3::new(0.0, 1.0, 7.0));
    }

    #[test]
    fn failed_loads_dismiss_the_loading_screen() {
        let cfg = GameConfig {
            asset_dir: "/nonexistent/assets".into(),
            ..config()
        };
        let mut session = LevelSession::start(LevelKind::BucketSortRoom, &cfg, &DurableStore::in_memory());
        let mut store = DurableStore::in_memory();
        let input = InputState::new();

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
        while session.is_loading() && std::time::Instant::now() < deadline {
            frame(&mut session, &input, &mut store);
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert!(!session.is_loading());
        for _ in 0..40 {
            frame(&mut session, &input, &mut store);
        }
        assert!(!session.loading().is_visible());
        assert!(session.registry().is_empty());
    }

    #[test]
    fn status_shows_hover_target() {
        let mut session =
            main_dungeon_with(vec![door("wall_doorway_door_heapsort_ready", Vec3::new(0.0, 1.0, -5.0))]);
        let mut store = DurableStore::in_memory();
        frame(&mut session, &locked(), &mut store);
        let status = session.status_line();
        assert!(status.contains("wall_doorway_door_heapsort_ready"), "{}", status);
        assert!(status.contains("Heapsort"), "{}", status);
    }
}
