use std::ops::Range;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::core::{
    Domain, ExtentsInput, FallbackEnd, PaneConfig, PaneDeclaration, PaneId, PlotDatum, Point,
    Scale, ScaleKind, Viewport, WindowHints, XAccessor, YPan, closest_index, layout,
    update_y_scales, window,
};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{PanAnchor, PinchAnchor, solve_pinch_domain};

use super::validation::{validate_domain, validate_engine_config, validate_zoom_factor};
use super::{
    BoundaryTracker, ChartEngineConfig, ChartProps, DataRequests, ViewportState, XExtents,
    ZoomAnchorInput,
};

/// Whether the controller is in the middle of rebuilding its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ReconcilePhase {
    #[default]
    Resting,
    Reconciling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoomDirection {
    In,
    Out,
}

/// Inputs a [`ViewportState`] is assembled from.
struct StateSources<'a, T> {
    viewport: Viewport,
    data: &'a Arc<[T]>,
    x_accessor: &'a XAccessor<T>,
    display_x_accessor: &'a XAccessor<T>,
    declarations: &'a [PaneDeclaration<T>],
}

impl<T: PlotDatum> StateSources<'_, T> {
    fn assemble(
        &self,
        plot_range: Range<usize>,
        x_scale: Scale,
        previous_panes: Option<&[PaneConfig]>,
        y_pan: Option<YPan<'_>>,
    ) -> ChartResult<ViewportState<T>> {
        let panes = layout(self.viewport, self.declarations, previous_panes)?;
        let plot_data = self.data.get(plot_range.clone()).unwrap_or_default();
        let input = ExtentsInput {
            plot_data,
            full_data: self.data,
            x_domain: x_scale.domain(),
            x_accessor: self.x_accessor,
        };
        let panes = update_y_scales(&panes, self.declarations, &input, y_pan);
        Ok(ViewportState {
            viewport: self.viewport,
            full_data: Arc::clone(self.data),
            plot_range,
            x_scale,
            x_accessor: self.x_accessor.clone(),
            display_x_accessor: self.display_x_accessor.clone(),
            panes,
        })
    }
}

/// Sole owner of the viewport state.
///
/// Every domain change goes through one of the operations below, which
/// re-window the data, lay the panes out again and swap the state in one step.
pub struct ViewportController<T> {
    config: ChartEngineConfig,
    series_name: String,
    x_extents: XExtents<T>,
    x_scale_kind: ScaleKind,
    declarations: Vec<PaneDeclaration<T>>,
    state: ViewportState<T>,
    boundary: BoundaryTracker,
    phase: ReconcilePhase,
}

impl<T: PlotDatum> ViewportController<T> {
    pub fn new(config: ChartEngineConfig, props: ChartProps<T>) -> ChartResult<Self> {
        let config = validate_engine_config(config)?;
        let state = initial_state(&config, &props)?;
        let mut boundary = BoundaryTracker::default();
        boundary.arm_silently(state.x_domain(), state.first_x(), state.last_x());
        debug!(
            series = %props.series_name,
            rows = state.full_data().len(),
            visible = state.plot_range().len(),
            "viewport initialized"
        );
        Ok(Self {
            config,
            series_name: props.series_name,
            x_extents: props.x_extents,
            x_scale_kind: props.x_scale_kind,
            declarations: props.panes,
            state,
            boundary,
            phase: ReconcilePhase::Resting,
        })
    }

    #[must_use]
    pub fn state(&self) -> &ViewportState<T> {
        &self.state
    }

    #[must_use]
    pub fn config(&self) -> &ChartEngineConfig {
        &self.config
    }

    #[must_use]
    pub fn phase(&self) -> ReconcilePhase {
        self.phase
    }

    #[must_use]
    pub fn series_name(&self) -> &str {
        &self.series_name
    }

    #[must_use]
    pub fn declarations(&self) -> &[PaneDeclaration<T>] {
        &self.declarations
    }

    /// `true` when `props` describe a different series or x-extent and the
    /// incremental path does not apply.
    #[must_use]
    pub fn needs_reset(&self, props: &ChartProps<T>) -> bool {
        props.series_name != self.series_name
            || !props.x_extents.same_as(&self.x_extents)
            || props.x_scale_kind != self.x_scale_kind
            || !props.x_accessor.same_as(self.state.x_accessor())
    }

    /// Current props, rebuilt from controller state.
    #[must_use]
    pub fn current_props(&self) -> ChartProps<T> {
        ChartProps {
            series_name: self.series_name.clone(),
            data: Arc::clone(&self.state.full_data),
            x_accessor: self.state.x_accessor.clone(),
            display_x_accessor: Some(self.state.display_x_accessor.clone()),
            x_extents: self.x_extents.clone(),
            x_scale_kind: self.x_scale_kind,
            panes: self.declarations.clone(),
        }
    }

    /// Rebuilds everything from `props`, dropping user pan/zoom state.
    pub fn reset_from_props(&mut self, props: ChartProps<T>) -> ChartResult<()> {
        self.phase = ReconcilePhase::Reconciling;
        let state = initial_state(&self.config, &props);
        self.phase = ReconcilePhase::Resting;
        let state = state?;

        self.boundary
            .arm_silently(state.x_domain(), state.first_x(), state.last_x());
        debug!(series = %props.series_name, rows = state.full_data().len(), "viewport reset");
        self.store_props(props);
        self.state = state;
        Ok(())
    }

    /// Incremental update for new data or a new width on the same series.
    ///
    /// When the last row was visible and new rows arrive past the domain end,
    /// the domain slides so the newest row keeps the old right edge. Otherwise
    /// the domain end stays put and the start follows the new width.
    pub fn update_on_prop_change(&mut self, props: ChartProps<T>) -> ChartResult<()> {
        self.phase = ReconcilePhase::Reconciling;
        let state = self.incremental_state(&props);
        self.phase = ReconcilePhase::Resting;
        let state = state?;

        debug!(
            rows = state.full_data().len(),
            visible = state.plot_range().len(),
            "viewport updated"
        );
        self.store_props(props);
        self.state = state;
        Ok(())
    }

    fn incremental_state(&self, props: &ChartProps<T>) -> ChartResult<ViewportState<T>> {
        let old_scale = self.state.x_scale;
        let Domain { start, end } = old_scale.domain();
        let (new_range_start, new_range_end) = Scale::x_range_for(
            props.x_scale_kind,
            f64::from(self.config.viewport.width),
            self.config.x_padding,
            self.config.flip_x,
        )?;
        let resized = old_scale.with_range(new_range_start, new_range_end);
        let options = self.config.window_options(props.x_accessor.is_identity());

        let last_item_was_visible = self
            .state
            .last_x()
            .is_some_and(|last| old_scale.domain().contains(last));
        let new_last_x = props.data.last().map(|row| props.x_accessor.value(row));

        let result = match new_last_x {
            Some(new_last_x) if last_item_was_visible && end < new_last_x => {
                let dx = old_scale.map(new_last_x) - old_scale.range().1;
                let domain = old_scale.invert_range_with(|edge| edge + dx);
                trace!(dx, "sliding domain to keep the newest row on the edge");
                window(
                    &props.data,
                    &props.x_accessor,
                    domain,
                    &resized,
                    &options,
                    &WindowHints::default(),
                )?
            }
            _ => {
                let (old_range_start, old_range_end) = old_scale.range();
                let old_span = old_range_end - old_range_start;
                let new_start = if self.config.maintain_points_per_pixel_on_resize
                    && old_span != 0.0
                {
                    end - (new_range_end - new_range_start) / old_span * (end - start)
                } else {
                    start
                };
                let hints = WindowHints {
                    current: None,
                    fallback_start: Some(start),
                    fallback_end: new_last_x.map(|last_x| FallbackEnd {
                        last_x,
                        last_item_px: old_scale.map(last_x),
                    }),
                };
                window(
                    &props.data,
                    &props.x_accessor,
                    Domain::new(new_start, end),
                    &resized,
                    &options,
                    &hints,
                )?
            }
        };

        let display_x_accessor = props
            .display_x_accessor
            .as_ref()
            .unwrap_or(&props.x_accessor);
        StateSources {
            viewport: self.config.viewport,
            data: &props.data,
            x_accessor: &props.x_accessor,
            display_x_accessor,
            declarations: &props.panes,
        }
        .assemble(
            result.range,
            resized.with_domain(result.domain),
            Some(&self.state.panes),
            None,
        )
    }

    /// Applies a new config; geometry changes reset the domain, a new
    /// viewport resizes it.
    pub fn set_config(&mut self, config: ChartEngineConfig) -> ChartResult<()> {
        let config = validate_engine_config(config)?;
        let reset = self.config.requires_reset(&config);
        let resized = self.config.viewport != config.viewport;
        self.config = config;
        if reset {
            self.reset_from_props(self.current_props())
        } else if resized {
            self.update_on_prop_change(self.current_props())
        } else {
            Ok(())
        }
    }

    pub fn resize(&mut self, viewport: Viewport) -> ChartResult<()> {
        let viewport = viewport.validate()?;
        if viewport == self.config.viewport {
            return Ok(());
        }
        self.config.viewport = viewport;
        self.update_on_prop_change(self.current_props())
    }

    /// State the chart would have for `domain`, keeping the current window
    /// when `domain` cannot be shown.
    pub fn compute_state_for_domain(&self, domain: Domain) -> ChartResult<ViewportState<T>> {
        self.state_for_domain(domain, &self.state.panes, None)
    }

    fn state_for_domain(
        &self,
        domain: Domain,
        previous_panes: &[PaneConfig],
        y_pan: Option<YPan<'_>>,
    ) -> ChartResult<ViewportState<T>> {
        let domain = validate_domain(domain, "x domain")?;
        let x_scale = self.state.x_scale;
        let options = self
            .config
            .window_options(self.state.x_accessor.is_identity());
        let result = window(
            &self.state.full_data,
            &self.state.x_accessor,
            domain,
            &x_scale,
            &options,
            &WindowHints::keep_current(self.state.window()),
        )?;
        self.sources().assemble(
            result.range,
            x_scale.with_domain(result.domain),
            Some(previous_panes),
            y_pan,
        )
    }

    fn sources(&self) -> StateSources<'_, T> {
        StateSources {
            viewport: self.config.viewport,
            data: &self.state.full_data,
            x_accessor: &self.state.x_accessor,
            display_x_accessor: &self.state.display_x_accessor,
            declarations: &self.declarations,
        }
    }

    fn commit(&mut self, state: ViewportState<T>) -> DataRequests {
        self.phase = ReconcilePhase::Reconciling;
        self.state = state;
        let requests = self.boundary.observe(
            self.state.x_domain(),
            self.state.first_x(),
            self.state.last_x(),
        );
        self.phase = ReconcilePhase::Resting;
        requests
    }

    /// Moves the viewport to `domain`.
    pub fn zoom_to_domain(&mut self, domain: Domain) -> ChartResult<DataRequests> {
        let state = self.compute_state_for_domain(domain)?;
        Ok(self.commit(state))
    }

    /// Re-checks the data edges against the current domain.
    pub fn check_boundaries(&mut self) -> DataRequests {
        self.boundary.observe(
            self.state.x_domain(),
            self.state.first_x(),
            self.state.last_x(),
        )
    }

    /// Puts back a state captured earlier, such as at gesture start.
    ///
    /// The boundary latches follow the restored domain, so a later crossing
    /// is reported again.
    pub fn restore(&mut self, state: ViewportState<T>) {
        debug!(domain = ?state.x_domain(), "viewport restored");
        self.boundary
            .arm_silently(state.x_domain(), state.first_x(), state.last_x());
        self.state = state;
    }

    /// Pan to `position` relative to the anchor's start.
    ///
    /// Offsets are always measured from the pan-start scale so intermediate
    /// frames never accumulate error.
    pub fn apply_pan(&mut self, anchor: &PanAnchor, position: Point) -> ChartResult<DataRequests> {
        let dx = position.x - anchor.origin.x;
        let dy = position.y - anchor.origin.y;
        let domain = anchor.start_x_scale.invert_range_with(|edge| edge - dx);
        trace!(dx, dy, "pan step");
        let state = self.state_for_domain(
            domain,
            &anchor.start_panes,
            Some(YPan {
                dy,
                panes: &anchor.panes_to_pan,
            }),
        )?;
        Ok(self.commit(state))
    }

    /// Scales range offsets around `anchor_px` by `factor` (> 1 zooms out).
    pub fn apply_zoom(&mut self, anchor_px: f64, factor: f64) -> ChartResult<DataRequests> {
        let factor = validate_zoom_factor(factor)?;
        if !anchor_px.is_finite() {
            return Err(ChartError::InvalidData(
                "zoom anchor must be finite".to_owned(),
            ));
        }
        let domain = self
            .state
            .x_scale
            .invert_range_with(|edge| anchor_px + (edge - anchor_px) * factor);
        trace!(anchor_px, factor, "zoom step");
        let state = self.compute_state_for_domain(domain)?;
        Ok(self.commit(state))
    }

    /// Range factor for one wheel step in `direction`.
    #[must_use]
    pub fn zoom_factor(&self, direction: ZoomDirection) -> f64 {
        match direction {
            ZoomDirection::In => 1.0 / self.config.zoom_multiplier,
            ZoomDirection::Out => self.config.zoom_multiplier,
        }
    }

    /// Anchor pixel of the configured zoom anchor.
    #[must_use]
    pub fn zoom_anchor_px(&self, mouse: Point) -> f64 {
        let plot_data = self.state.plot_data();
        let x_accessor = &self.state.x_accessor;
        let nearest = closest_index(plot_data, x_accessor, self.state.x_scale.invert(mouse.x));
        let last_visible_x = plot_data.last().map(|row| x_accessor.value(row));
        self.config.zoom_anchor.anchor_px(&ZoomAnchorInput {
            x_scale: self.state.x_scale,
            mouse,
            mouse_item: nearest.map(|index| self.state.plot_range().start + index),
            mouse_item_x: nearest
                .and_then(|index| plot_data.get(index))
                .map(|row| x_accessor.value(row)),
            last_visible_x,
        })
    }

    /// Applies the pinch for the current touch pair. `None` means the touches
    /// collapsed and nothing changed.
    pub fn apply_pinch(
        &mut self,
        anchor: &PinchAnchor,
        current: (Point, Point),
    ) -> ChartResult<Option<DataRequests>> {
        let Some(domain) = solve_pinch_domain(
            &anchor.start_x_scale,
            (anchor.touch_start.0.x, anchor.touch_start.1.x),
            (current.0.x, current.1.x),
        ) else {
            return Ok(None);
        };
        let state = self.compute_state_for_domain(domain)?;
        Ok(Some(self.commit(state)))
    }

    /// Zooms the x-axis by dragging it `delta_px` from a captured start scale.
    pub fn x_axis_drag(
        &mut self,
        start_x_scale: &Scale,
        delta_px: f64,
    ) -> ChartResult<DataRequests> {
        let Some(domain) = axis_drag_domain(start_x_scale, delta_px) else {
            return Ok(DataRequests::new());
        };
        let state = self.compute_state_for_domain(domain)?;
        Ok(self.commit(state))
    }

    /// Sets a user-owned y-domain on `pane`.
    pub fn set_pane_y_domain(&mut self, pane: PaneId, domain: Domain) -> ChartResult<()> {
        let domain = validate_domain(domain, "pane y domain")?;
        self.pane_mut(pane)?.set_user_y_domain(domain)
    }

    /// Scales `pane`'s y range offsets around `anchor_y` (pane pixels).
    pub fn zoom_pane_y(&mut self, pane: PaneId, anchor_y: f64, factor: f64) -> ChartResult<()> {
        let factor = validate_zoom_factor(factor)?;
        let config = self.pane_mut(pane)?;
        let domain = config
            .y_scale
            .invert_range_with(|edge| anchor_y + (edge - anchor_y) * factor);
        config.set_user_y_domain(domain)
    }

    /// Zooms `pane`'s y-axis by a drag of `delta_px` from `start_domain`.
    pub fn y_axis_drag(
        &mut self,
        pane: PaneId,
        start_domain: Domain,
        delta_px: f64,
    ) -> ChartResult<bool> {
        let start_domain = validate_domain(start_domain, "axis drag start domain")?;
        let config = self.pane_mut(pane)?;
        let start_scale = config.y_scale.with_domain(start_domain);
        let Some(domain) = axis_drag_domain(&start_scale, delta_px) else {
            return Ok(false);
        };
        config.set_user_y_domain(domain)?;
        Ok(true)
    }

    /// Drops user y-pan/zoom on `pane`.
    pub fn reset_y_domain(&mut self, pane: PaneId) -> ChartResult<()> {
        self.pane_mut(pane)?.reset_y_domain();
        Ok(())
    }

    pub fn reset_all_y_domains(&mut self) {
        for pane in &mut self.state.panes {
            pane.reset_y_domain();
        }
    }

    fn pane_mut(&mut self, pane: PaneId) -> ChartResult<&mut PaneConfig> {
        self.state
            .panes
            .iter_mut()
            .find(|config| config.id == pane)
            .ok_or_else(|| ChartError::InvalidData(format!("unknown {pane}")))
    }

    fn store_props(&mut self, props: ChartProps<T>) {
        self.series_name = props.series_name;
        self.x_extents = props.x_extents;
        self.x_scale_kind = props.x_scale_kind;
        self.declarations = props.panes;
    }
}

fn initial_state<T: PlotDatum>(
    config: &ChartEngineConfig,
    props: &ChartProps<T>,
) -> ChartResult<ViewportState<T>> {
    let extents = validate_domain(
        props.x_extents.resolve(&props.data, &props.x_accessor),
        "x extents",
    )?;
    let (range_start, range_end) = Scale::x_range_for(
        props.x_scale_kind,
        f64::from(config.viewport.width),
        config.x_padding,
        config.flip_x,
    )?;
    let x_scale = Scale::new(props.x_scale_kind, extents)?.with_range(range_start, range_end);
    let options = config.window_options(props.x_accessor.is_identity());
    options.validate()?;
    let result = window(
        &props.data,
        &props.x_accessor,
        extents,
        &x_scale,
        &options,
        &WindowHints::default(),
    )?;

    let display_x_accessor = props
        .display_x_accessor
        .as_ref()
        .unwrap_or(&props.x_accessor);
    StateSources {
        viewport: config.viewport,
        data: &props.data,
        x_accessor: &props.x_accessor,
        display_x_accessor,
        declarations: &props.panes,
    }
    .assemble(result.range, x_scale.with_domain(result.domain), None, None)
}

/// Domain after dragging an axis `delta_px` away from its start: the range
/// grows by `delta_px` around its midpoint.
fn axis_drag_domain(start_scale: &Scale, delta_px: f64) -> Option<Domain> {
    let span = start_scale.range_span();
    if span == 0.0 || !delta_px.is_finite() {
        return None;
    }
    let factor = 1.0 + delta_px / span;
    if factor <= 0.0 {
        warn!(delta_px, span, "axis drag would invert the axis, ignoring");
        return None;
    }
    let (range_start, range_end) = start_scale.range();
    let center = (range_start + range_end) / 2.0;
    Some(start_scale.invert_range_with(|edge| center + (edge - center) * factor))
}
