//! The batch session: one value owning all client-side state.
//!
//! A [`Session`] holds the file collection, the per-item deletion flags,
//! the staged local export, the active crop editor, and the busy gates of
//! both export pipelines. The UI keeps it in a single reactive cell and
//! drives it through the command methods below.
//!
//! Every successful collection mutation bumps [`Session::revision`] and
//! clears the deletion flags; previews are rebuilt whenever the revision
//! changes.
//!
//! Export runs that must `.await` are split into a snapshot ([`LocalJob`],
//! [`RemoteJob`]) taken from the session, so no borrow of the session is
//! held while the run is suspended.

use crate::caption::Caption;
use crate::collection::FileCollection;
use crate::crop::{CropSession, CropSource, CropWidget};
use crate::gate::{BusyGuard, ExportGate};
use crate::local_export::{self, StagedExport};
use crate::remote::{self, ProcessingEndpoint, RemoteArchive};
use crate::types::{BatchConfig, BatchError, ProcessedImage, SelectedFile};

/// Client-side state for one batch.
pub struct Session<W> {
    config: BatchConfig,
    files: FileCollection,
    selected: Vec<bool>,
    staged: Option<StagedExport>,
    crop: Option<CropSession<W>>,
    crop_revision: u64,
    revision: u64,
    local_gate: ExportGate,
    remote_gate: ExportGate,
}

impl<W> Default for Session<W> {
    fn default() -> Self {
        Self::new(BatchConfig::default())
    }
}

impl<W> Session<W> {
    /// Create an empty session.
    #[must_use]
    pub fn new(config: BatchConfig) -> Self {
        Self {
            config,
            files: FileCollection::new(),
            selected: Vec::new(),
            staged: None,
            crop: None,
            crop_revision: 0,
            revision: 0,
            local_gate: ExportGate::new(),
            remote_gate: ExportGate::new(),
        }
    }

    /// Tunables this session was created with.
    #[must_use]
    pub const fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// The selected files, in order.
    #[must_use]
    pub const fn files(&self) -> &FileCollection {
        &self.files
    }

    /// Incremented on every collection mutation.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    fn mutated(&mut self) {
        self.revision += 1;
        self.selected = vec![false; self.files.len()];
    }

    // --- collection ---------------------------------------------------

    /// Append newly chosen files.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::CapacityExceeded`] if the batch would grow
    /// past its limit; nothing is added in that case.
    pub fn add_files(&mut self, new_files: Vec<SelectedFile>) -> Result<(), BatchError> {
        let adding = new_files.len();
        if adding == 0 {
            return Ok(());
        }
        self.files
            .add(new_files)
            .inspect_err(|e| tracing::info!(error = %e, "add rejected"))?;
        tracing::debug!(adding, total = self.files.len(), "files added");
        self.mutated();
        Ok(())
    }

    /// Whether the entry at `index` is marked for deletion.
    #[must_use]
    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.get(index).copied().unwrap_or(false)
    }

    /// Mark or unmark one entry for deletion.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::ResourceState`] if `index` is out of bounds.
    pub fn set_selected(&mut self, index: usize, selected: bool) -> Result<(), BatchError> {
        let len = self.selected.len();
        let flag = self.selected.get_mut(index).ok_or_else(|| {
            let e = BatchError::out_of_bounds(index, len);
            tracing::warn!(error = %e, "selection toggle ignored");
            e
        })?;
        *flag = selected;
        Ok(())
    }

    /// Mark or unmark every entry.
    pub fn set_all_selected(&mut self, selected: bool) {
        self.selected.fill(selected);
    }

    /// Returns `true` if at least one entry is marked.
    #[must_use]
    pub fn any_selected(&self) -> bool {
        self.selected.iter().any(|&s| s)
    }

    /// Returns `true` if the batch is non-empty and every entry is marked.
    #[must_use]
    pub fn all_selected(&self) -> bool {
        !self.selected.is_empty() && self.selected.iter().all(|&s| s)
    }

    /// Remove every marked entry, returning how many were removed.
    pub fn remove_selected(&mut self) -> usize {
        let flags = std::mem::take(&mut self.selected);
        let removed = self
            .files
            .remove_where(|i, _| flags.get(i).copied().unwrap_or(false));
        if removed == 0 {
            self.selected = flags;
        } else {
            tracing::debug!(removed, remaining = self.files.len(), "files removed");
            self.mutated();
        }
        removed
    }

    /// Whether the select-all and delete controls are shown.
    #[must_use]
    pub const fn show_selection_controls(&self) -> bool {
        !self.files.is_empty()
    }

    /// Whether the export controls are enabled.
    #[must_use]
    pub const fn export_enabled(&self) -> bool {
        !self.files.is_empty()
    }

    // --- crop ---------------------------------------------------------

    /// The open crop editor, if any.
    #[must_use]
    pub const fn crop(&self) -> Option<&CropSession<W>> {
        self.crop.as_ref()
    }

    /// Mutable access to the open crop editor.
    pub const fn crop_mut(&mut self) -> Option<&mut CropSession<W>> {
        self.crop.as_mut()
    }

    /// Close the crop editor without applying it.
    ///
    /// Returns `true` if an editor was open. Its widget is released
    /// before this returns.
    pub fn cancel_crop(&mut self) -> bool {
        let was_open = self.crop.take().is_some();
        if was_open {
            tracing::debug!("crop cancelled");
        }
        was_open
    }

    // --- export -------------------------------------------------------

    /// Result of the last successful local export.
    #[must_use]
    pub const fn staged(&self) -> Option<&StagedExport> {
        self.staged.as_ref()
    }

    /// Replace the staged local export.
    pub fn stage(&mut self, export: StagedExport) {
        tracing::debug!(count = export.len(), "local export staged");
        self.staged = Some(export);
    }

    /// Busy gate of the local pipeline.
    #[must_use]
    pub const fn local_gate(&self) -> &ExportGate {
        &self.local_gate
    }

    /// Busy gate of the remote pipeline.
    #[must_use]
    pub const fn remote_gate(&self) -> &ExportGate {
        &self.remote_gate
    }

    /// Run the local pipeline to completion and stage the result.
    ///
    /// Returns the number of images staged. On failure the previously
    /// staged export is kept.
    ///
    /// This blocks for the whole batch. Hosts that must repaint between
    /// images use [`Session::local_job`] and stage the result themselves.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::Busy`], [`BatchError::NothingToExport`], or
    /// the first per-item failure.
    pub fn run_local_export(&mut self, caption_text: &str) -> Result<usize, BatchError> {
        let export = local_export::run_guarded(
            &self.local_gate,
            self.files.as_slice(),
            caption_text,
            self.config.jpeg_quality,
        )?;
        let count = export.len();
        self.stage(export);
        Ok(count)
    }

    /// Snapshot the batch for an incremental local export.
    #[must_use]
    pub fn local_job(&self, caption_text: &str) -> LocalJob {
        LocalJob {
            gate: self.local_gate.clone(),
            files: self.files.as_slice().to_vec(),
            caption: Caption::parse(caption_text),
            quality: self.config.jpeg_quality,
        }
    }

    /// Snapshot the batch for a remote export.
    #[must_use]
    pub fn remote_job(&self) -> RemoteJob {
        RemoteJob {
            gate: self.remote_gate.clone(),
            files: self.files.as_slice().to_vec(),
            config: self.config.clone(),
        }
    }

    /// Upload the batch through `endpoint`.
    ///
    /// Borrows the session for the whole request. Hosts that keep the
    /// session in a reactive cell run a [`Session::remote_job`] instead.
    ///
    /// # Errors
    ///
    /// See [`RemoteJob::run`].
    #[allow(clippy::future_not_send)]
    pub async fn run_remote_export<E: ProcessingEndpoint>(
        &self,
        endpoint: &E,
    ) -> Result<RemoteArchive, BatchError> {
        self.remote_job().run(endpoint).await
    }
}

impl<W: CropWidget> Session<W> {
    /// Open the crop editor on the entry at `index`.
    ///
    /// Any editor already open is closed, and its widget released,
    /// before the new widget is created.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::ResourceState`] for an out-of-bounds index,
    /// [`BatchError::DecodeFailure`] if the file cannot be decoded, or
    /// whatever `make_widget` fails with.
    pub fn open_crop(
        &mut self,
        index: usize,
        make_widget: impl FnOnce(&CropSource) -> Result<W, BatchError>,
    ) -> Result<(), BatchError> {
        self.crop = None;
        let file = self.files.get(index).ok_or_else(|| {
            let e = BatchError::out_of_bounds(index, self.files.len());
            tracing::warn!(error = %e, "crop not opened");
            e
        })?;
        let session = CropSession::open(index, file, make_widget)?;
        tracing::debug!(index, name = file.name(), "crop opened");
        self.crop = Some(session);
        self.crop_revision = self.revision;
        Ok(())
    }

    /// Apply the open crop editor to its entry and close it.
    ///
    /// The cropped JPEG replaces the entry in place. The editor is closed
    /// whether or not this succeeds. Returns the index that was replaced.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::ResourceState`] if no editor is open, if the
    /// collection changed since it was opened, or if the selected region
    /// is empty, and
    /// [`BatchError::EncodeFailure`] if the crop cannot be encoded. The
    /// collection is unchanged on error.
    pub fn confirm_crop(&mut self, now_ms: u64) -> Result<usize, BatchError> {
        let Some(session) = self.crop.take() else {
            let e = BatchError::ResourceState("no crop session is open".to_owned());
            tracing::warn!(error = %e, "crop confirm ignored");
            return Err(e);
        };
        let index = session.index();
        if index >= self.files.len() {
            let e = BatchError::out_of_bounds(index, self.files.len());
            tracing::warn!(error = %e, "crop confirm discarded");
            return Err(e);
        }
        // Indices shift on removal, so a stale editor may now point at
        // a different file.
        if self.crop_revision != self.revision {
            let e = BatchError::ResourceState(format!(
                "collection changed while {} was being cropped",
                session.source().name
            ));
            tracing::warn!(
                error = %e,
                opened_at = self.crop_revision,
                revision = self.revision,
                "crop confirm discarded"
            );
            return Err(e);
        }

        let cropped = session.render(self.config.jpeg_quality, now_ms)?;
        drop(session);
        self.files.replace_at(index, cropped)?;
        tracing::debug!(index, "crop applied");
        self.mutated();
        Ok(index)
    }
}

impl<W> std::fmt::Debug for Session<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("files", &self.files.len())
            .field("revision", &self.revision)
            .field("staged", &self.staged.as_ref().map(StagedExport::len))
            .field("crop", &self.crop)
            .finish_non_exhaustive()
    }
}

/// A local export snapshot, rendered one item at a time.
#[derive(Debug, Clone)]
pub struct LocalJob {
    gate: ExportGate,
    files: Vec<SelectedFile>,
    caption: Option<Caption>,
    quality: u8,
}

impl LocalJob {
    /// Number of images the job will render.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if there is nothing to render.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Close the local gate for the duration of the run.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::Busy`] if a run is in progress, or
    /// [`BatchError::NothingToExport`] for an empty snapshot.
    pub fn start(&self) -> Result<BusyGuard, BatchError> {
        let guard = self.gate.try_acquire()?;
        if self.files.is_empty() {
            return Err(BatchError::NothingToExport);
        }
        tracing::info!(
            count = self.files.len(),
            captioned = self.caption.is_some(),
            "local export started"
        );
        Ok(guard)
    }

    /// Render the snapshot lazily, in order.
    pub fn items(&self) -> impl Iterator<Item = Result<ProcessedImage, BatchError>> + '_ {
        local_export::render_each(&self.files, self.caption.as_ref(), self.quality)
    }
}

/// A remote export snapshot.
#[derive(Debug, Clone)]
pub struct RemoteJob {
    gate: ExportGate,
    files: Vec<SelectedFile>,
    config: BatchConfig,
}

impl RemoteJob {
    /// Upload the snapshot while holding the remote gate.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::Busy`], [`BatchError::NothingToExport`], or
    /// [`BatchError::RemoteProcessingFailure`].
    #[allow(clippy::future_not_send)]
    pub async fn run<E: ProcessingEndpoint>(
        self,
        endpoint: &E,
    ) -> Result<RemoteArchive, BatchError> {
        remote::run_guarded(&self.gate, endpoint, &self.files, &self.config).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use futures::executor::block_on;
    use image::ImageEncoder;

    use super::*;
    use crate::collection::MAX_FILES;
    use crate::crop::CropRect;
    use crate::remote::{EndpointResponse, RemoteRequest};

    /// Counts live instances so tests can observe release.
    struct CountingWidget {
        rect: CropRect,
        live: Rc<Cell<usize>>,
    }

    impl CountingWidget {
        fn factory(
            live: &Rc<Cell<usize>>,
            rect: Option<CropRect>,
        ) -> impl FnOnce(&CropSource) -> Result<Self, BatchError> + '_ {
            move |src| {
                live.set(live.get() + 1);
                Ok(Self {
                    rect: rect.unwrap_or_else(|| src.initial_rect()),
                    live: Rc::clone(live),
                })
            }
        }
    }

    impl CropWidget for CountingWidget {
        fn crop_rect(&self) -> CropRect {
            self.rect
        }
    }

    impl Drop for CountingWidget {
        fn drop(&mut self) {
            self.live.set(self.live.get() - 1);
        }
    }

    fn png(name: &str, width: u32, height: u32) -> SelectedFile {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([9, 99, 199, 255]));
        let mut buf = Vec::new();
        image::codecs::png::PngEncoder::new(&mut buf)
            .write_image(
                img.as_raw(),
                width,
                height,
                image::ExtendedColorType::Rgba8,
            )
            .unwrap();
        SelectedFile::new(name, "image/png", 5, buf)
    }

    fn session_with(names: &[&str]) -> Session<CountingWidget> {
        let mut session = Session::default();
        session
            .add_files(names.iter().map(|n| png(n, 16, 12)).collect())
            .unwrap();
        session
    }

    fn names<W>(session: &Session<W>) -> Vec<&str> {
        session.files().iter().map(SelectedFile::name).collect()
    }

    #[test]
    fn empty_session_disables_export_and_hides_controls() {
        let session: Session<CountingWidget> = Session::default();
        assert!(!session.export_enabled());
        assert!(!session.show_selection_controls());
        assert_eq!(session.revision(), 0);
    }

    #[test]
    fn add_bumps_revision_and_enables_export() {
        let session = session_with(&["a.png", "b.png"]);
        assert_eq!(session.revision(), 1);
        assert!(session.export_enabled());
        assert!(session.show_selection_controls());
    }

    #[test]
    fn over_capacity_add_changes_nothing() {
        let mut session = session_with(&["a.png"]);
        let before = session.files().clone();
        let too_many = (0..MAX_FILES).map(|i| png(&format!("{i}.png"), 2, 2)).collect();
        let err = session.add_files(too_many).unwrap_err();
        assert!(matches!(err, BatchError::CapacityExceeded { current: 1, .. }));
        assert_eq!(session.files(), &before);
        assert_eq!(session.revision(), 1);
    }

    #[test]
    fn remove_selected_keeps_survivor_order() {
        let mut session = session_with(&["a.png", "b.png", "c.png", "d.png"]);
        session.set_selected(1, true).unwrap();
        session.set_selected(3, true).unwrap();
        assert!(session.any_selected());

        assert_eq!(session.remove_selected(), 2);
        assert_eq!(names(&session), ["a.png", "c.png"]);
        assert!(!session.any_selected());
        assert_eq!(session.revision(), 2);
    }

    #[test]
    fn remove_with_nothing_selected_is_not_a_mutation() {
        let mut session = session_with(&["a.png"]);
        assert_eq!(session.remove_selected(), 0);
        assert_eq!(session.revision(), 1);
    }

    #[test]
    fn removing_everything_hides_selection_controls() {
        let mut session = session_with(&["a.png", "b.png"]);
        session.set_all_selected(true);
        assert!(session.all_selected());
        session.remove_selected();
        assert!(session.files().is_empty());
        assert!(!session.show_selection_controls());
        assert!(!session.export_enabled());
    }

    #[test]
    fn selection_out_of_bounds_is_resource_state() {
        let mut session = session_with(&["a.png"]);
        assert!(matches!(
            session.set_selected(4, true),
            Err(BatchError::ResourceState(_))
        ));
    }

    #[test]
    fn adding_resets_selection() {
        let mut session = session_with(&["a.png"]);
        session.set_selected(0, true).unwrap();
        session.add_files(vec![png("b.png", 4, 4)]).unwrap();
        assert!(!session.any_selected());
        assert!(!session.is_selected(0));
    }

    #[test]
    fn confirm_crop_replaces_only_target_entry() {
        let live = Rc::new(Cell::new(0));
        let mut session = session_with(&["a.png", "b.png", "c.png"]);
        let untouched = session.files().get(0).unwrap().clone();
        let rect = CropRect {
            x: 2,
            y: 2,
            width: 8,
            height: 6,
        };
        session
            .open_crop(1, CountingWidget::factory(&live, Some(rect)))
            .unwrap();
        assert_eq!(live.get(), 1);

        assert_eq!(session.confirm_crop(777).unwrap(), 1);
        assert!(session.crop().is_none());
        assert_eq!(live.get(), 0);

        let replaced = session.files().get(1).unwrap();
        assert_eq!(replaced.name(), "b.png");
        assert_eq!(replaced.mime_type(), "image/jpeg");
        assert_eq!(replaced.last_modified(), 777);
        let decoded = image::load_from_memory(replaced.bytes()).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 6));
        assert_eq!(session.files().get(0).unwrap(), &untouched);
        assert_eq!(session.files().len(), 3);
        assert_eq!(session.revision(), 2);
    }

    #[test]
    fn opening_a_second_crop_releases_the_first_widget_first() {
        let live = Rc::new(Cell::new(0));
        let peak = Rc::new(Cell::new(usize::MAX));
        let mut session = session_with(&["a.png", "b.png"]);
        session
            .open_crop(0, CountingWidget::factory(&live, None))
            .unwrap();

        let live_at_creation = Rc::clone(&peak);
        let live_probe = Rc::clone(&live);
        session
            .open_crop(1, move |src| {
                live_at_creation.set(live_probe.get());
                CountingWidget::factory(&live_probe, None)(src)
            })
            .unwrap();

        assert_eq!(peak.get(), 0, "old widget must be gone before the new one");
        assert_eq!(live.get(), 1);
        assert_eq!(session.crop().unwrap().index(), 1);
    }

    #[test]
    fn cancel_releases_widget_and_keeps_files() {
        let live = Rc::new(Cell::new(0));
        let mut session = session_with(&["a.png"]);
        let before = session.files().clone();
        session
            .open_crop(0, CountingWidget::factory(&live, None))
            .unwrap();
        assert!(session.cancel_crop());
        assert_eq!(live.get(), 0);
        assert_eq!(session.files(), &before);
        assert!(!session.cancel_crop());
    }

    #[test]
    fn confirm_after_removal_fails_and_closes() {
        let live = Rc::new(Cell::new(0));
        let mut session = session_with(&["a.png", "b.png"]);
        session
            .open_crop(1, CountingWidget::factory(&live, None))
            .unwrap();
        session.set_selected(1, true).unwrap();
        session.remove_selected();
        let before = session.files().clone();

        assert!(matches!(
            session.confirm_crop(0),
            Err(BatchError::ResourceState(_))
        ));
        assert!(session.crop().is_none());
        assert_eq!(live.get(), 0);
        assert_eq!(session.files(), &before);
    }

    #[test]
    fn confirm_after_earlier_removal_keeps_shifted_entry() {
        let live = Rc::new(Cell::new(0));
        let mut session = session_with(&["a.png", "b.png", "c.png"]);
        session
            .open_crop(1, CountingWidget::factory(&live, None))
            .unwrap();
        session.set_selected(0, true).unwrap();
        session.remove_selected();
        let before = session.files().clone();
        assert_eq!(names(&session), ["b.png", "c.png"]);

        assert!(matches!(
            session.confirm_crop(0),
            Err(BatchError::ResourceState(_))
        ));
        assert!(session.crop().is_none());
        assert_eq!(live.get(), 0);
        assert_eq!(session.files(), &before);
        assert_eq!(names(&session), ["b.png", "c.png"]);
    }

    #[test]
    fn confirm_without_session_is_resource_state() {
        let mut session = session_with(&["a.png"]);
        assert!(matches!(
            session.confirm_crop(0),
            Err(BatchError::ResourceState(_))
        ));
    }

    #[test]
    fn open_crop_out_of_bounds_creates_no_widget() {
        let live = Rc::new(Cell::new(0));
        let mut session = session_with(&["a.png"]);
        assert!(matches!(
            session.open_crop(3, CountingWidget::factory(&live, None)),
            Err(BatchError::ResourceState(_))
        ));
        assert_eq!(live.get(), 0);
    }

    #[test]
    fn local_export_stages_and_failure_keeps_prior_stage() {
        let mut session = session_with(&["a.png", "b.png"]);
        assert_eq!(session.run_local_export("2024-01-01").unwrap(), 2);
        let staged = session.staged().unwrap().clone();

        session
            .add_files(vec![SelectedFile::new("bad.jpg", "image/jpeg", 0, vec![7])])
            .unwrap();
        assert!(session.run_local_export("").is_err());
        assert_eq!(session.staged(), Some(&staged));
        assert!(!session.local_gate().is_busy());
    }

    #[test]
    fn local_export_on_empty_session_is_a_no_op() {
        let mut session: Session<CountingWidget> = Session::default();
        assert_eq!(
            session.run_local_export("x"),
            Err(BatchError::NothingToExport)
        );
        assert!(session.staged().is_none());
    }

    #[test]
    fn local_job_renders_incrementally_under_the_gate() {
        let session = session_with(&["a.png", "b.png"]);
        let job = session.local_job("  ");
        assert_eq!(job.len(), 2);

        let guard = job.start().unwrap();
        assert!(session.local_gate().is_busy());
        assert_eq!(job.start().unwrap_err(), BatchError::Busy);

        let names: Vec<_> = job.items().map(|r| r.unwrap().name).collect();
        assert_eq!(names, ["a.png", "b.png"]);
        drop(guard);
        assert!(!session.local_gate().is_busy());
    }

    #[test]
    fn empty_local_job_releases_gate() {
        let session: Session<CountingWidget> = Session::default();
        let job = session.local_job("");
        assert_eq!(job.start().unwrap_err(), BatchError::NothingToExport);
        assert!(!session.local_gate().is_busy());
    }

    struct StatusEndpoint(u16);

    impl ProcessingEndpoint for StatusEndpoint {
        async fn process(&self, _: &RemoteRequest) -> Result<EndpointResponse, BatchError> {
            Ok(EndpointResponse {
                status: self.0,
                body: b"zip".to_vec(),
            })
        }
    }

    #[test]
    fn remote_failure_leaves_session_usable() {
        let session = session_with(&["a.png"]);
        let err = block_on(session.run_remote_export(&StatusEndpoint(500))).unwrap_err();
        assert!(matches!(err, BatchError::RemoteProcessingFailure(_)));
        assert!(!session.remote_gate().is_busy());
        assert_eq!(session.files().len(), 1);

        let archive = block_on(session.run_remote_export(&StatusEndpoint(200))).unwrap();
        assert_eq!(archive.bytes, b"zip");
    }
}
