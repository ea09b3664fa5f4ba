// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module wires the drag engine, the sampling pipeline, and the
//! media source together, coordinating between the UI surfaces and the
//! data model.

use std::sync::mpsc::{channel, Receiver};

use crate::engine::drag::{ClickOutcome, DragEngine, TimelineTarget};
use crate::io::media::{self, ImageSequenceSource, MediaSource};
use crate::io::serialization::AnnotationDoc;
use crate::io::upload::{self, HttpDatasetSink, UploadEvent};
use crate::io::{export, serialization};
use crate::models::annotation::Annotation;
use crate::models::frame::FrameSet;
use crate::models::session::{EditSession, Notice};
use crate::sampling::{SampleRun, StepOutcome};
use crate::ui::properties::{PropertiesAction, UploadForm};
use crate::ui::timeline::TimelineAction;
use crate::ui::toolbar::ToolbarAction;
use crate::ui::{overlay, properties, timeline, toolbar};

/// History system for undo/redo of marker edits.
struct History {
    /// Undo stack (past states)
    undo_stack: Vec<Vec<Annotation>>,
    /// Redo stack (future states after undo)
    redo_stack: Vec<Vec<Annotation>>,
    /// Maximum history size
    max_size: usize,
}

impl History {
    fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size: 50, // Keep last 50 states
        }
    }

    /// Save current state before making a change
    fn push(&mut self, annotations: Vec<Annotation>) {
        self.undo_stack.push(annotations);
        // Limit history size
        if self.undo_stack.len() > self.max_size {
            self.undo_stack.remove(0);
        }
        // Clear redo stack when new action is performed
        self.redo_stack.clear();
    }

    /// Undo: restore previous state
    fn undo(&mut self, current: Vec<Annotation>) -> Option<Vec<Annotation>> {
        if let Some(previous) = self.undo_stack.pop() {
            self.redo_stack.push(current);
            Some(previous)
        } else {
            None
        }
    }

    /// Redo: restore next state
    fn redo(&mut self, current: Vec<Annotation>) -> Option<Vec<Annotation>> {
        if let Some(next) = self.redo_stack.pop() {
            self.undo_stack.push(current);
            Some(next)
        } else {
            None
        }
    }

    fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

/// Current pointer mode on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Scrub,
    Select,
}

/// Sampling controls shared between the toolbar and the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct SamplingSettings {
    pub hz: f64,
    pub burn_in: bool,
}

impl Default for SamplingSettings {
    fn default() -> Self {
        Self {
            hz: crate::config::DEFAULT_SAMPLE_HZ,
            burn_in: true,
        }
    }
}

/// Main application state.
pub struct TrimarkApp {
    /// Current timeline pointer mode
    mode: Mode,

    /// Editing session for the loaded source (if any)
    session: Option<EditSession>,

    /// The loaded media source
    media: Option<Box<dyn MediaSource>>,

    /// The single gesture state machine for both surfaces
    engine: DragEngine,

    /// Texture of the currently displayed frame
    frame_texture: Option<egui::TextureHandle>,

    /// Position the texture was last uploaded for
    texture_pos: f64,

    /// Sampling controls
    settings: SamplingSettings,

    /// In-flight sampling run, stepped once per update tick
    run: Option<SampleRun>,

    /// Output of the most recent completed run
    frames: Option<FrameSet>,

    /// History for undo/redo
    history: History,

    /// Latest user-facing notice
    notice: Option<Notice>,

    /// Receiver for background folder scanning
    sequence_loader: Option<Receiver<Result<media::LoadedSequence, String>>>,

    /// Loading state message
    loading_message: Option<String>,

    /// Dataset upload form state
    upload_form: UploadForm,

    /// Receiver for background upload progress
    upload_events: Option<Receiver<UploadEvent>>,

    /// Last upload status line
    upload_status: Option<String>,
}

impl Default for TrimarkApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TrimarkApp {
    /// Create a new Trimark application instance.
    pub fn new() -> Self {
        Self {
            mode: Mode::Scrub,
            session: None,
            media: None,
            engine: DragEngine::new(),
            frame_texture: None,
            texture_pos: -1.0,
            settings: SamplingSettings::default(),
            run: None,
            frames: None,
            history: History::new(),
            notice: None,
            sequence_loader: None,
            loading_message: None,
            upload_form: UploadForm::default(),
            upload_events: None,
            upload_status: None,
        }
    }

    fn notify(&mut self, notice: Notice) {
        if notice.error {
            log::error!("{}: {}", notice.title, notice.detail);
        } else {
            log::info!("{}: {}", notice.title, notice.detail);
        }
        self.notice = Some(notice);
    }

    /// Open a folder of frames asynchronously (scan on a worker thread).
    fn open_folder(&mut self, dir: std::path::PathBuf) {
        let (sender, receiver) = channel();
        self.sequence_loader = Some(receiver);
        self.loading_message = Some("Loading frame folder...".to_string());

        std::thread::spawn(move || {
            let result = media::scan_sequence(&dir).map_err(|e| format!("{e:#}"));
            let _ = sender.send(result);
        });
    }

    /// Install a freshly scanned sequence as the active source.
    fn install_sequence(&mut self, loaded: media::LoadedSequence, ctx: &egui::Context) {
        let size = [loaded.width as usize, loaded.height as usize];
        let color_image =
            egui::ColorImage::from_rgba_unmultiplied(size, loaded.first_frame.as_raw());
        let texture = ctx.load_texture("frame", color_image, egui::TextureOptions::LINEAR);

        let name = loaded.name.clone();
        let (w, h) = (loaded.width, loaded.height);
        let source = ImageSequenceSource::new(loaded);
        let duration = source.duration();

        log::info!("loaded sequence {name}: {w}x{h}, {duration:.2}s");

        self.session = Some(EditSession::new(name, duration, w, h));
        self.media = Some(Box::new(source));
        self.frame_texture = Some(texture);
        self.texture_pos = 0.0;
        self.engine = DragEngine::new();
        self.run = None;
        self.frames = None;
        self.history.clear();
        self.upload_status = None;
    }

    /// Abort any in-flight run, restoring the transport.
    fn cancel_run(&mut self) {
        if let (Some(run), Some(media)) = (self.run.take(), self.media.as_deref_mut()) {
            run.abort(media);
            log::info!("sampling run cancelled");
        }
    }

    /// Start a sampling run over the current selection. Replaces any
    /// in-flight run; previous frames are released before capture.
    fn start_sampling(&mut self) {
        // Validate before touching anything, including an in-flight run.
        if self.session.is_none() || self.media.is_none() {
            self.notify(Notice::error("Cannot sample", "No media loaded"));
            return;
        }
        if self.session.as_ref().is_some_and(|s| s.selection.is_none()) {
            self.notify(Notice::error(
                "Cannot sample",
                "Select a time range first (Select mode)",
            ));
            return;
        }

        self.cancel_run();

        let (Some(session), Some(media)) = (self.session.as_ref(), self.media.as_deref_mut())
        else {
            return;
        };

        match SampleRun::begin(
            media,
            session.selection,
            self.settings.hz,
            self.settings.burn_in,
            session.sequence_tag(),
        ) {
            Ok(run) => {
                self.frames = None;
                self.run = Some(run);
            }
            Err(e) => self.notify(Notice::error("Sampling failed", format!("{e:#}"))),
        }
    }

    /// Advance the in-flight run by one suspension slice.
    fn step_sampling(&mut self) {
        let Some(mut run) = self.run.take() else { return };
        let (Some(session), Some(media)) = (self.session.as_ref(), self.media.as_deref_mut())
        else {
            return;
        };

        match run.step(media, &session.store) {
            Ok(StepOutcome::Pending) => self.run = Some(run),
            Ok(StepOutcome::Done) => {
                let set = run.finish(media);
                log::info!("captured {} frames", set.len());
                self.frames = Some(set);
            }
            Err(e) => {
                run.abort(media);
                self.notify(Notice::error("Sampling aborted", format!("{e:#}")));
            }
        }
    }

    fn toggle_play(&mut self) {
        let Some(media) = self.media.as_deref_mut() else { return };
        let target = !media.is_paused();
        // target is the new paused flag: pausing always succeeds,
        // resuming may be rejected by the source.
        if let Err(e) = media.set_paused(target) {
            let _ = media.set_paused(true);
            self.notify(Notice::error("Playback rejected", format!("{e:#}")));
        }
    }

    fn reset_session(&mut self) {
        self.cancel_run();
        if let Some(session) = self.session.as_mut() {
            session.reset();
        }
        self.engine = DragEngine::new();
        self.frames = None;
        self.history.clear();
        self.notify(Notice::info("Session reset", "Markers and selection cleared"));
    }

    fn delete_annotation(&mut self, id: uuid::Uuid) {
        let Some(session) = self.session.as_mut() else { return };
        if session.store.get(id).is_some() {
            self.history.push(session.store.to_vec());
            session.store.remove(id);
            if self.engine.selected() == Some(id) {
                self.engine.select(None);
            }
            log::info!("deleted marker, total: {}", session.store.len());
        }
    }

    fn undo(&mut self) {
        if let Some(session) = self.session.as_mut() {
            let current = session.store.to_vec();
            if let Some(previous) = self.history.undo(current) {
                session.store.replace(previous);
                self.engine.select(None);
                log::info!("undo");
            }
        }
    }

    fn redo(&mut self) {
        if let Some(session) = self.session.as_mut() {
            let current = session.store.to_vec();
            if let Some(next) = self.history.redo(current) {
                session.store.replace(next);
                self.engine.select(None);
                log::info!("redo");
            }
        }
    }

    /// Export the captured frame set as a zip archive.
    fn export_archive(&mut self, path: std::path::PathBuf) {
        let (Some(frames), Some(session)) = (self.frames.as_ref(), self.session.as_ref()) else {
            self.notify(Notice::error("Cannot export", "No sampled frames"));
            return;
        };

        match export::pack_archive(frames, &session.store, &session.source_name)
            .and_then(|bytes| std::fs::write(&path, bytes).map_err(Into::into))
        {
            Ok(()) => self.notify(Notice::info(
                "Archive exported",
                path.display().to_string(),
            )),
            Err(e) => self.notify(Notice::error("Export failed", format!("{e:#}"))),
        }
    }

    /// Export the marker set alone (YAML or JSON by extension).
    fn export_annotations(&mut self, path: std::path::PathBuf) {
        let Some(session) = self.session.as_ref() else { return };
        let doc = AnnotationDoc::from_session(session);

        let extension = path.extension().and_then(|s| s.to_str());
        let result = match extension {
            Some("yaml") | Some("yml") => serialization::export_yaml(&doc, &path),
            Some("json") => serialization::export_json(&doc, &path),
            _ => {
                self.notify(Notice::error(
                    "Export failed",
                    format!("Unsupported file extension: {extension:?}"),
                ));
                return;
            }
        };

        match result {
            Ok(()) => self.notify(Notice::info("Markers exported", path.display().to_string())),
            Err(e) => self.notify(Notice::error("Export failed", format!("{e:#}"))),
        }
    }

    /// Start uploading the captured frames to the dataset service.
    fn start_upload(&mut self) {
        let (Some(frames), Some(session)) = (self.frames.as_ref(), self.session.as_ref()) else {
            self.notify(Notice::error("Cannot upload", "No sampled frames"));
            return;
        };

        let sink = Box::new(HttpDatasetSink::new(
            self.upload_form.base_url.clone(),
            self.upload_form.api_key.clone(),
            self.upload_form.part_id.clone(),
        ));

        // Frame bytes in capture order; the run tag always leads the
        // tag list so uploads stay traceable to the run.
        let data: Vec<Vec<u8>> = frames.frames.iter().map(|f| f.data.clone()).collect();
        let mut tags = vec![frames.sequence_tag.clone(), session.source_name.clone()];
        tags.extend(self.upload_form.tags());

        self.upload_events = Some(upload::spawn_upload(
            sink,
            data,
            tags,
            self.upload_form.dataset.clone(),
        ));
        self.upload_status = Some("Uploading...".to_string());
    }

    /// Route a timeline action through the drag engine.
    fn handle_timeline_action(&mut self, action: TimelineAction) {
        let Some(session) = self.session.as_mut() else { return };
        let select_mode = self.mode == Mode::Select;

        match action {
            TimelineAction::Pressed { target, frac } => {
                if matches!(
                    target,
                    TimelineTarget::AnnotationBody(_)
                        | TimelineTarget::AnnotationStart(_)
                        | TimelineTarget::AnnotationEnd(_)
                ) {
                    self.history.push(session.store.to_vec());
                }
                self.engine.timeline_press(target, frac, select_mode, session);
            }
            TimelineAction::Dragged { frac } => {
                self.engine.timeline_move(frac, session);
            }
            TimelineAction::Released => self.engine.release(),
            TimelineAction::Clicked { target, frac } => {
                self.engine.timeline_press(target, frac, select_mode, session);
                self.engine.release();
            }
            TimelineAction::None => {}
        }
    }

    /// Route an overlay action through the drag engine.
    fn handle_overlay_action(&mut self, action: overlay::OverlayAction) {
        let Some(session) = self.session.as_mut() else { return };

        match action {
            overlay::OverlayAction::Pressed { fx, fy } => {
                let snapshot = session.store.to_vec();
                if self.engine.overlay_press(fx, fy, session) {
                    self.history.push(snapshot);
                }
            }
            overlay::OverlayAction::Dragged { fx, fy } => {
                self.engine.overlay_move(fx, fy, session);
            }
            overlay::OverlayAction::Released => self.engine.release(),
            overlay::OverlayAction::Clicked { fx, fy } => {
                let snapshot = session.store.to_vec();
                match self.engine.overlay_click(fx, fy, session) {
                    ClickOutcome::Created(id) => {
                        self.history.push(snapshot);
                        log::info!("created marker {id}");
                    }
                    ClickOutcome::Duplicate(id) => {
                        self.notify(Notice::info(
                            "Marker already there",
                            "Selected the existing marker at this spot",
                        ));
                        log::info!("duplicate spot, selected {id}");
                    }
                    ClickOutcome::Selected(id) => log::info!("selected marker {id}"),
                    ClickOutcome::Ignored => {}
                }
            }
            overlay::OverlayAction::None => {}
        }
    }

    /// Keep the media position and the displayed texture in sync with
    /// the playhead. Suspended while a run owns the transport.
    fn sync_media(&mut self, ctx: &egui::Context, dt: f64) {
        let (Some(session), Some(media)) = (self.session.as_mut(), self.media.as_deref_mut())
        else {
            return;
        };

        // While a run is in flight the pipeline owns the transport and
        // this sync only mirrors its motion into the texture below.
        if self.run.is_none() {
            if !media.is_paused() {
                media.advance(dt);
                session.playhead = media.position();
                ctx.request_repaint();
            } else if (media.position() - session.playhead).abs() > 1e-6 {
                media.request_seek(session.playhead);
                media.poll_seek();
            }
        }

        // Refresh the texture when the displayed position moved.
        let pos = media.position();
        if (self.texture_pos - pos).abs() > 1e-9 {
            match media.frame() {
                Ok(frame) => {
                    let size = [frame.width() as usize, frame.height() as usize];
                    let color_image =
                        egui::ColorImage::from_rgba_unmultiplied(size, frame.as_raw());
                    if let Some(texture) = self.frame_texture.as_mut() {
                        texture.set(color_image, egui::TextureOptions::LINEAR);
                    }
                    self.texture_pos = pos;
                }
                Err(e) => log::warn!("frame refresh failed: {e:#}"),
            }
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }

        if ctx.input(|i| i.key_pressed(egui::Key::Space)) && self.run.is_none() {
            self.toggle_play();
        }

        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.engine.select(None);
        }

        if ctx.input(|i| i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace)) {
            if let Some(id) = self.engine.selected() {
                self.delete_annotation(id);
            }
        }

        // One sequence frame per arrow press.
        let nudge = 1.0 / crate::config::SEQUENCE_FPS;
        if ctx.input(|i| i.key_pressed(egui::Key::ArrowLeft)) {
            if let Some(session) = self.session.as_mut() {
                session.playhead = session.clamp_time(session.playhead - nudge);
            }
        }
        if ctx.input(|i| i.key_pressed(egui::Key::ArrowRight)) {
            if let Some(session) = self.session.as_mut() {
                session.playhead = session.clamp_time(session.playhead + nudge);
            }
        }

        if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::Z) && !i.modifiers.shift) {
            self.undo();
        }
        if ctx.input(|i| {
            (i.modifiers.command && i.modifiers.shift && i.key_pressed(egui::Key::Z))
                || (i.modifiers.command && i.key_pressed(egui::Key::Y))
        }) {
            self.redo();
        }
    }

    fn poll_background(&mut self, ctx: &egui::Context) {
        // Folder scan results.
        if let Some(receiver) = &self.sequence_loader {
            if let Ok(result) = receiver.try_recv() {
                self.sequence_loader = None;
                self.loading_message = None;
                match result {
                    Ok(loaded) => self.install_sequence(loaded, ctx),
                    Err(e) => self.notify(Notice::error("Load failed", e)),
                }
            }
        }

        // Upload progress.
        let mut done = false;
        let mut failure = None;
        if let Some(receiver) = &self.upload_events {
            while let Ok(event) = receiver.try_recv() {
                match event {
                    UploadEvent::Progress { sent, total } => {
                        self.upload_status = Some(format!("Uploading {sent}/{total}"));
                    }
                    UploadEvent::Finished { count } => {
                        self.upload_status = Some(format!("Uploaded {count} frames"));
                        done = true;
                    }
                    UploadEvent::Failed(message) => {
                        failure = Some(message);
                        done = true;
                    }
                }
            }
        }
        if let Some(message) = failure {
            self.upload_status = Some("Upload failed".to_string());
            self.notify(Notice::error("Upload failed", message));
        }
        if done {
            self.upload_events = None;
        }
    }

    fn menu_bar(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Open Frame Folder...").clicked() {
                    if let Some(dir) = rfd::FileDialog::new().pick_folder() {
                        self.open_folder(dir);
                    }
                    ui.close_menu();
                }
                ui.separator();
                let has_frames = self.frames.is_some();
                if ui
                    .add_enabled(has_frames, egui::Button::new("Export Frame Archive..."))
                    .clicked()
                {
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("Zip archive", &["zip"])
                        .set_file_name("frames.zip")
                        .save_file()
                    {
                        self.export_archive(path);
                    }
                    ui.close_menu();
                }
                ui.menu_button("Export Markers", |ui| {
                    if ui.button("Export as YAML...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("YAML", &["yaml", "yml"])
                            .set_file_name("markers.yaml")
                            .save_file()
                        {
                            self.export_annotations(path);
                        }
                        ui.close_menu();
                    }
                    if ui.button("Export as JSON...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("JSON", &["json"])
                            .set_file_name("markers.json")
                            .save_file()
                        {
                            self.export_annotations(path);
                        }
                        ui.close_menu();
                    }
                });
                ui.separator();
                if ui.button("Quit").clicked() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            ui.menu_button("Edit", |ui| {
                let can_undo = self.history.can_undo();
                if ui
                    .add_enabled(can_undo, egui::Button::new("Undo (Ctrl+Z)"))
                    .clicked()
                {
                    self.undo();
                    ui.close_menu();
                }

                let can_redo = self.history.can_redo();
                if ui
                    .add_enabled(can_redo, egui::Button::new("Redo (Ctrl+Shift+Z)"))
                    .clicked()
                {
                    self.redo();
                    ui.close_menu();
                }

                ui.separator();

                let has_selection = self.engine.selected().is_some();
                if ui
                    .add_enabled(has_selection, egui::Button::new("Delete Selected"))
                    .clicked()
                {
                    if let Some(id) = self.engine.selected() {
                        self.delete_annotation(id);
                    }
                    ui.close_menu();
                }
            });
        });
    }

    fn notice_strip(&mut self, ui: &mut egui::Ui) {
        let Some(notice) = self.notice.clone() else { return };
        let color = if notice.error {
            egui::Color32::from_rgb(220, 90, 90)
        } else {
            egui::Color32::from_rgb(120, 180, 120)
        };
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(&notice.title).color(color).strong());
            ui.label(egui::RichText::new(&notice.detail).weak());
            if ui.small_button("✕").clicked() {
                self.notice = None;
            }
        });
    }
}


impl eframe::App for TrimarkApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_background(ctx);

        // One suspension slice per tick keeps the UI responsive while a
        // run is in flight.
        if self.run.is_some() {
            self.step_sampling();
            ctx.request_repaint();
        }

        let dt = ctx.input(|i| i.stable_dt) as f64;
        self.sync_media(ctx, dt);
        self.handle_keys(ctx);

        if self.loading_message.is_some() {
            ctx.request_repaint();
        }

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            self.menu_bar(ctx, ui);
        });

        // Toolbar
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| {
                let playing = self.media.as_deref().map(|m| !m.is_paused()).unwrap_or(false);
                let (playhead, duration) = self
                    .session
                    .as_ref()
                    .map(|s| (s.playhead, s.duration))
                    .unwrap_or((0.0, 0.0));
                toolbar::show(
                    ui,
                    &mut self.mode,
                    &mut self.settings,
                    self.media.is_some(),
                    playing,
                    self.run.is_some(),
                    self.frames.is_some(),
                    playhead,
                    duration,
                )
            })
            .inner;

        match toolbar_action {
            ToolbarAction::TogglePlay => self.toggle_play(),
            ToolbarAction::Sample => self.start_sampling(),
            ToolbarAction::ExportArchive => {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Zip archive", &["zip"])
                    .set_file_name("frames.zip")
                    .save_file()
                {
                    self.export_archive(path);
                }
            }
            ToolbarAction::Reset => self.reset_session(),
            ToolbarAction::None => {}
        }

        // Notice strip + sampling progress
        if self.notice.is_some() || self.run.is_some() {
            egui::TopBottomPanel::top("status").show(ctx, |ui| {
                self.notice_strip(ui);
                if let Some(run) = &self.run {
                    ui.horizontal(|ui| {
                        ui.label(format!(
                            "Sampling frame {}/{}",
                            run.captured().min(run.total().saturating_sub(1)) + 1,
                            run.total()
                        ));
                        ui.add(
                            egui::ProgressBar::new(run.progress() as f32 / 100.0)
                                .show_percentage()
                                .desired_width(240.0),
                        );
                    });
                }
            });
        }

        // Properties panel (right side)
        let properties_action = egui::SidePanel::right("properties")
            .default_width(260.0)
            .show(ctx, |ui| {
                properties::show(
                    ui,
                    self.session.as_mut(),
                    self.engine.selected(),
                    &mut self.upload_form,
                    self.frames.is_some(),
                    self.upload_status.as_deref(),
                )
            })
            .inner;

        match properties_action {
            PropertiesAction::SelectAnnotation(id) => self.engine.select(Some(id)),
            PropertiesAction::DeleteAnnotation(id) => self.delete_annotation(id),
            PropertiesAction::Upload => self.start_upload(),
            PropertiesAction::None => {}
        }

        // Timeline (bottom)
        let timeline_action = egui::TopBottomPanel::bottom("timeline")
            .show(ctx, |ui| match self.session.as_ref() {
                Some(session) => timeline::show(ui, session, self.engine.selected()),
                None => {
                    ui.label(egui::RichText::new("No media loaded").weak());
                    TimelineAction::None
                }
            })
            .inner;
        self.handle_timeline_action(timeline_action);

        // Gestures mutate state every move; keep frames coming.
        if self.engine.is_dragging() {
            ctx.request_repaint();
        }

        // Main overlay (center)
        let overlay_action = egui::CentralPanel::default()
            .show(ctx, |ui| {
                if let Some(message) = &self.loading_message {
                    ui.centered_and_justified(|ui| {
                        ui.vertical_centered(|ui| {
                            ui.add_space(20.0);
                            ui.spinner();
                            ui.add_space(10.0);
                            ui.label(
                                egui::RichText::new(message)
                                    .size(16.0)
                                    .color(egui::Color32::from_gray(200)),
                            );
                        });
                    });
                    overlay::OverlayAction::None
                } else {
                    overlay::show(
                        ui,
                        self.session.as_ref(),
                        &self.frame_texture,
                        self.engine.selected(),
                    )
                }
            })
            .inner;
        self.handle_overlay_action(overlay_action);
    }
}
