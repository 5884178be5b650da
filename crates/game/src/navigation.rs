//! Navigation dispatch: what a select action does to the session.

use crate::classify::{Destination, NavigationBinding};
use crate::registry::binding_of;
use glam::Vec3;
use hecs::{Entity, World};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavigationState {
    Idle,
    ActionPending(Entity),
    /// Terminal: the session is leaving for a page.
    RedirectingExternally(Destination),
    Teleporting(Vec3),
    ShowingOverlayStep,
}

/// Side effect the session must carry out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavigationEffect {
    /// Save the player view, then leave for the page.
    Redirect(Destination),
    /// Move the player to the target.
    Teleport(Vec3),
    /// Open the overlay at step 1.
    OpenOverlay,
}

impl From<NavigationBinding> for NavigationEffect {
    fn from(binding: NavigationBinding) -> Self {
        match binding {
            NavigationBinding::Redirect(destination) => NavigationEffect::Redirect(destination),
            NavigationBinding::Teleport(target) => NavigationEffect::Teleport(target),
            NavigationBinding::Overlay => NavigationEffect::OpenOverlay,
        }
    }
}

/// Select-action state machine for one level session.
#[derive(Debug)]
pub struct NavigationDispatcher {
    state: NavigationState,
}

impl Default for NavigationDispatcher {
    fn default() -> Self {
        Self {
            state: NavigationState::Idle,
        }
    }
}

impl NavigationDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn state(&self) -> NavigationState {
        self.state
    }

    /// Handle a select action.
    ///
    /// Nothing happens without a selection, when look lock is required but not
    /// engaged, or after a redirect has already been issued.
    pub fn select(
        &mut self,
        world: &World,
        selection: Option<Entity>,
        look_ready: bool,
    ) -> Option<NavigationEffect> {
        if matches!(self.state, NavigationState::RedirectingExternally(_)) || !look_ready {
            return None;
        }
        let entity = selection?;

        self.state = NavigationState::ActionPending(entity);
        let effect = binding_of(world, entity).map(NavigationEffect::from);
        self.state = match effect {
            Some(NavigationEffect::Redirect(destination)) => {
                log::info!("Leaving for {}", destination.page());
                NavigationState::RedirectingExternally(destination)
            }
            Some(NavigationEffect::Teleport(target)) => {
                log::info!("Teleporting to {}", target);
                NavigationState::Teleporting(target)
            }
            Some(NavigationEffect::OpenOverlay) => NavigationState::ShowingOverlayStep,
            None => NavigationState::Idle,
        };
        effect
    }

    /// Settle transient states at the end of a frame.
    pub fn settle(&mut self, overlay_open: bool) {
        self.state = match self.state {
            NavigationState::RedirectingExternally(d) => NavigationState::RedirectingExternally(d),
            _ if overlay_open => NavigationState::ShowingOverlayStep,
            _ => NavigationState::Idle,
        };
    }
}
