use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::PaneId;
use crate::error::{ChartError, ChartResult};
use crate::interaction::{MutableInteractionState, PanConditions};

use super::{ChartEvent, DrawTrigger, MoreProps, ViewportState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriberId(u64);

impl SubscriberId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CursorStyle {
    #[default]
    Default,
    Crosshair,
    Pointer,
    Grab,
    Grabbing,
    Move,
    EwResize,
    NsResize,
}

/// Single-owner cursor override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CursorSlot {
    owner: Option<SubscriberId>,
    style: CursorStyle,
}

impl CursorSlot {
    #[must_use]
    pub fn owner(&self) -> Option<SubscriberId> {
        self.owner
    }

    #[must_use]
    pub fn style(&self) -> Option<CursorStyle> {
        self.owner.map(|_| self.style)
    }

    /// Takes the slot for `id`. Fails while another subscriber owns it.
    pub fn claim(&mut self, id: SubscriberId, style: CursorStyle) -> bool {
        match self.owner {
            Some(owner) if owner != id => false,
            _ => {
                self.owner = Some(id);
                self.style = style;
                true
            }
        }
    }

    /// Frees the slot if `id` owns it.
    pub fn release(&mut self, id: SubscriberId) -> bool {
        if self.owner != Some(id) {
            return false;
        }
        self.owner = None;
        self.style = CursorStyle::Default;
        true
    }
}

/// Per-call view handed to `Subscriber::listen`.
pub struct EventContext<'a, T> {
    pub id: SubscriberId,
    pub state: &'a ViewportState<T>,
    pub interaction: &'a MutableInteractionState,
    pub cursor: &'a mut CursorSlot,
    on_top: bool,
}

impl<T> EventContext<'_, T> {
    /// `true` when this subscriber is the one draggable on top at the pointer.
    #[must_use]
    pub fn is_on_top(&self) -> bool {
        self.on_top
    }

    pub fn claim_cursor(&mut self, style: CursorStyle) -> bool {
        self.cursor.claim(self.id, style)
    }

    pub fn release_cursor(&mut self) -> bool {
        self.cursor.release(self.id)
    }
}

/// Drawable collaborator registered with the engine.
pub trait Subscriber<T, S> {
    fn listen(&mut self, _event: &ChartEvent, _ctx: &mut EventContext<'_, T>) {}

    /// Called exactly once per redraw pass.
    fn draw(
        &mut self,
        _trigger: DrawTrigger,
        _surface: &mut S,
        _props: &MoreProps<'_, T>,
    ) -> ChartResult<()> {
        Ok(())
    }

    fn pan_conditions(&self) -> PanConditions {
        PanConditions::default()
    }

    /// Pane the subscriber draws in; `None` for chart-wide drawables.
    fn pane_id(&self) -> Option<PaneId> {
        None
    }

    fn decorate<'a>(&self, props: MoreProps<'a, T>) -> MoreProps<'a, T> {
        props
    }
}

/// Registration-ordered subscriber table.
pub struct SubscriptionRegistry<T, S> {
    entries: IndexMap<SubscriberId, Box<dyn Subscriber<T, S>>>,
}

impl<T, S> Default for SubscriptionRegistry<T, S> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<T, S> SubscriptionRegistry<T, S> {
    pub fn subscribe(
        &mut self,
        id: SubscriberId,
        subscriber: Box<dyn Subscriber<T, S>>,
    ) -> ChartResult<()> {
        if self.entries.contains_key(&id) {
            return Err(ChartError::DuplicateSubscriber(id));
        }
        debug!(%id, "subscriber registered");
        self.entries.insert(id, subscriber);
        Ok(())
    }

    /// Removes `id`, releasing the cursor if it owned it. Returns `true` when
    /// removed.
    pub fn unsubscribe(&mut self, id: SubscriberId, cursor: &mut CursorSlot) -> bool {
        if self.entries.shift_remove(&id).is_none() {
            return false;
        }
        cursor.release(id);
        debug!(%id, "subscriber removed");
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: SubscriberId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = SubscriberId> + '_ {
        self.entries.keys().copied()
    }

    /// `true` when `id` is the one subscriber on top; see [`Self::top_draggable`].
    #[must_use]
    pub fn is_on_top(&self, id: SubscriberId, interaction: &MutableInteractionState) -> bool {
        self.top_draggable(hover_scope(interaction)) == Some(id)
    }

    /// Most recently registered subscriber that currently reports itself
    /// draggable. With `hovered` set, pane-bound subscribers only qualify
    /// while their pane is hovered; chart-wide ones always do.
    #[must_use]
    pub fn top_draggable(&self, hovered: Option<&[PaneId]>) -> Option<SubscriberId> {
        self.entries
            .iter()
            .rev()
            .find(|(_, subscriber)| {
                subscriber.pan_conditions().draggable
                    && hovered.is_none_or(|panes| {
                        subscriber.pane_id().is_none_or(|pane| panes.contains(&pane))
                    })
            })
            .map(|(id, _)| *id)
    }

    /// Subscriber that wins a pointer-down over `hovered` panes.
    #[must_use]
    pub fn drag_claimant(&self, hovered: &[PaneId]) -> Option<SubscriberId> {
        self.top_draggable(Some(hovered))
    }

    /// `false` when any subscriber currently forbids panning.
    #[must_use]
    pub fn pan_allowed(&self) -> bool {
        self.entries
            .values()
            .all(|subscriber| subscriber.pan_conditions().pan_enabled)
    }

    /// Fans `event` out to every subscriber in registration order.
    pub fn publish(
        &mut self,
        event: &ChartEvent,
        state: &ViewportState<T>,
        interaction: &MutableInteractionState,
        cursor: &mut CursorSlot,
    ) {
        let top = self.top_draggable(hover_scope(interaction));

        trace!(kind = ?event.kind, subscribers = self.entries.len(), "publish");
        for (id, subscriber) in &mut self.entries {
            let mut ctx = EventContext {
                id: *id,
                state,
                interaction,
                cursor: &mut *cursor,
                on_top: top == Some(*id),
            };
            subscriber.listen(event, &mut ctx);
        }
    }

    /// Delivers `event` to `id` only. Returns `false` when `id` is unknown.
    pub fn deliver_to(
        &mut self,
        id: SubscriberId,
        event: &ChartEvent,
        state: &ViewportState<T>,
        interaction: &MutableInteractionState,
        cursor: &mut CursorSlot,
    ) -> bool {
        let on_top = self.is_on_top(id, interaction);
        let Some(subscriber) = self.entries.get_mut(&id) else {
            trace!(%id, kind = ?event.kind, "event for unknown subscriber dropped");
            return false;
        };
        let mut ctx = EventContext {
            id,
            state,
            interaction,
            cursor,
            on_top,
        };
        subscriber.listen(event, &mut ctx);
        true
    }

    /// Calls every subscriber's `draw` once, in registration order.
    pub fn draw_all(
        &mut self,
        trigger: DrawTrigger,
        surface: &mut S,
        props: &MoreProps<'_, T>,
    ) -> ChartResult<()> {
        for subscriber in self.entries.values_mut() {
            let decorated = subscriber.decorate(props.clone());
            subscriber.draw(trigger, surface, &decorated)?;
        }
        Ok(())
    }
}

/// Hovered panes while the pointer is over the chart; `None` otherwise.
fn hover_scope(interaction: &MutableInteractionState) -> Option<&[PaneId]> {
    interaction
        .show
        .then_some(interaction.hovered_panes.as_slice())
}
