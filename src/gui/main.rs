#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use std::path::PathBuf;
use std::sync::mpsc;

use eframe::egui;

use exif_view::config::Config;
use exif_view::exif::{self, MetadataRecord};
use exif_view::format;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([760.0, 640.0])
        .with_min_inner_size([520.0, 420.0])
        .with_drag_and_drop(true);

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "exif-view",
        options,
        Box::new(|cc| Ok(Box::new(App::new(cc)))),
    )
}

// ── Messages sent from background load tasks to the UI ──────────────

enum BgMessage {
    /// Read + decode finished for the load tagged with this generation.
    Decoded {
        generation: u64,
        file_name: String,
        record: MetadataRecord,
        preview: Option<egui::ColorImage>,
    },
    /// The load tagged with this generation failed.
    Failed { generation: u64, message: String },
}

// ── Observable UI states ────────────────────────────────────────────

enum ViewState {
    /// No image selected yet.
    Idle,
    /// A file read/decode is in flight.
    Loading { file_name: String },
    /// Settled: decode succeeded.
    Loaded {
        file_name: String,
        record: MetadataRecord,
        preview: Option<egui::TextureHandle>,
    },
    /// Settled: read or decode failed. Any previous record is gone.
    Failed { message: String },
}

// ── Main application state ──────────────────────────────────────────

struct App {
    config: Config,
    state: ViewState,
    /// Monotonic load counter. Every new load bumps it; background results
    /// carry the generation they were spawned with, and stale ones are
    /// discarded on receipt. Last requested upload wins.
    generation: u64,
    status: String,
    rx: mpsc::Receiver<BgMessage>,
    tx: mpsc::Sender<BgMessage>,
    /// Tokio runtime for the background file reads.
    rt: tokio::runtime::Runtime,
}

impl App {
    fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let (tx, rx) = mpsc::channel();
        let config = Config::load(None).unwrap_or_default();

        Self {
            config,
            state: ViewState::Idle,
            generation: 0,
            status: "Ready — drop an image or click Open".into(),
            rx,
            tx,
            rt: tokio::runtime::Runtime::new().expect("Failed to create tokio runtime"),
        }
    }

    fn open_file(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", exif::SUPPORTED_EXTENSIONS)
            .pick_file()
        {
            self.load_path(path);
        }
    }

    fn load_path(&mut self, path: PathBuf) {
        let file_name = path
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        if !exif::is_supported_path(&path) {
            self.state = ViewState::Failed {
                message: format!("Unsupported file type: {file_name}"),
            };
            self.status = "Error".into();
            return;
        }

        self.generation += 1;
        let generation = self.generation;
        self.state = ViewState::Loading {
            file_name: file_name.clone(),
        };
        self.status = format!("Reading {file_name}…");

        let tx = self.tx.clone();
        let max_dimension = self.config.preview.max_dimension;

        self.rt.spawn(async move {
            let msg = match tokio::fs::read(&path).await {
                Ok(bytes) => match exif::decode(&bytes) {
                    Ok(record) => BgMessage::Decoded {
                        generation,
                        file_name,
                        record,
                        preview: render_preview(&bytes, max_dimension),
                    },
                    Err(e) => BgMessage::Failed {
                        generation,
                        message: e.to_string(),
                    },
                },
                Err(e) => BgMessage::Failed {
                    generation,
                    message: format!("Failed to read {file_name}: {e}"),
                },
            };
            let _ = tx.send(msg);
        });
    }

    fn clear(&mut self) {
        // Bump the generation so an in-flight load cannot resurrect state.
        self.generation += 1;
        self.state = ViewState::Idle;
        self.status = "Ready — drop an image or click Open".into();
    }

    fn poll_messages(&mut self, ctx: &egui::Context) {
        while let Ok(msg) = self.rx.try_recv() {
            match msg {
                BgMessage::Decoded {
                    generation,
                    file_name,
                    record,
                    preview,
                } => {
                    if generation != self.generation {
                        log::debug!("Discarding stale decode result (generation {generation})");
                        continue;
                    }
                    let preview = preview.map(|img| {
                        ctx.load_texture(file_name.as_str(), img, egui::TextureOptions::LINEAR)
                    });
                    self.status = format!("Decoded {file_name}");
                    self.state = ViewState::Loaded {
                        file_name,
                        record,
                        preview,
                    };
                }
                BgMessage::Failed {
                    generation,
                    message,
                } => {
                    if generation != self.generation {
                        log::debug!("Discarding stale error (generation {generation})");
                        continue;
                    }
                    log::warn!("Load failed: {message}");
                    self.status = "Error".into();
                    self.state = ViewState::Failed { message };
                }
            }
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_messages(ctx);

        // Request repaint while a load is in flight so we pick up messages
        if matches!(self.state, ViewState::Loading { .. }) {
            ctx.request_repaint();
        }

        // Handle dropped files — one image per invocation, first supported wins
        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .collect()
        });
        if !dropped.is_empty() {
            let path = dropped
                .iter()
                .find(|p| exif::is_supported_path(p))
                .unwrap_or(&dropped[0])
                .clone();
            self.load_path(path);
        }

        // ── Top bar ─────────────────────────────────────────────────
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("exif-view");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if matches!(self.state, ViewState::Loading { .. }) {
                        ui.spinner();
                    }
                    ui.label(&self.status);
                });
            });
        });

        // ── Bottom toolbar ──────────────────────────────────────────
        egui::TopBottomPanel::bottom("toolbar").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                if ui.button("📂 Open Image").clicked() {
                    self.open_file();
                }
                if ui
                    .add_enabled(
                        !matches!(self.state, ViewState::Idle),
                        egui::Button::new("🗑 Clear"),
                    )
                    .clicked()
                {
                    self.clear();
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.hyperlink_to("allen2dev", "https://allen2dev.github.io");
                });
            });
            ui.add_space(4.0);
        });

        // ── Central panel ───────────────────────────────────────────
        egui::CentralPanel::default().show(ctx, |ui| match &self.state {
            ViewState::Idle => {
                ui.centered_and_justified(|ui| {
                    ui.label(
                        egui::RichText::new("Drop an image here\nor click Open")
                            .size(18.0)
                            .color(egui::Color32::GRAY),
                    );
                });
            }
            ViewState::Loading { file_name } => {
                ui.centered_and_justified(|ui| {
                    ui.label(format!("Reading {file_name}…"));
                });
            }
            ViewState::Failed { message } => {
                ui.centered_and_justified(|ui| {
                    ui.colored_label(
                        egui::Color32::from_rgb(220, 50, 50),
                        format!("Error: {message}"),
                    );
                });
            }
            ViewState::Loaded {
                file_name,
                record,
                preview,
            } => {
                let precision = self.config.display.coordinate_precision;
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            match preview {
                                Some(tex) => {
                                    let size = tex.size_vec2();
                                    let max_h = 300.0;
                                    let scale = (max_h / size.y).min(1.0);
                                    ui.image(egui::load::SizedTexture::new(
                                        tex.id(),
                                        size * scale,
                                    ));
                                }
                                None => {
                                    ui.label(
                                        egui::RichText::new("No preview available")
                                            .color(egui::Color32::GRAY),
                                    );
                                }
                            }

                            ui.vertical(|ui| {
                                ui.heading(file_name);
                                ui.add_space(8.0);
                                show_record(ui, record, precision);
                            });
                        });
                    });
            }
        });
    }
}

/// Decode a preview thumbnail from the raw image bytes. `None` for formats
/// the `image` crate cannot decode (HEIC) — metadata still renders.
fn render_preview(bytes: &[u8], max_dimension: u32) -> Option<egui::ColorImage> {
    let img = image::load_from_memory(bytes).ok()?;
    let thumb = img.thumbnail(max_dimension, max_dimension);
    let size = [thumb.width() as usize, thumb.height() as usize];
    let rgba = thumb.to_rgba8();
    let pixels = rgba.as_flat_samples();
    Some(egui::ColorImage::from_rgba_unmultiplied(
        size,
        pixels.as_slice(),
    ))
}

/// The decoded record as a two-column grid, every field with an explicit
/// "unknown" fallback.
fn show_record(ui: &mut egui::Ui, record: &MetadataRecord, precision: usize) {
    let section = |ui: &mut egui::Ui, heading: &str| {
        ui.label(
            egui::RichText::new(heading)
                .small()
                .color(egui::Color32::GRAY),
        );
        ui.end_row();
    };
    let row = |ui: &mut egui::Ui, label: &str, value: String| {
        ui.label(egui::RichText::new(label).strong());
        ui.label(value);
        ui.end_row();
    };

    egui::Grid::new("metadata_grid")
        .num_columns(2)
        .spacing([12.0, 4.0])
        .show(ui, |ui| {
            section(ui, "CAMERA");
            row(ui, "Make", format::or_unknown(record.make.as_deref()));
            row(ui, "Model", format::or_unknown(record.model.as_deref()));

            section(ui, "EXPOSURE");
            row(
                ui,
                "Taken",
                format::timestamp(record.capture_timestamp.as_deref()),
            );
            row(
                ui,
                "Shutter",
                record
                    .exposure_time
                    .map(format::exposure_time)
                    .unwrap_or_else(|| format::UNKNOWN.into()),
            );
            row(
                ui,
                "Aperture",
                record
                    .f_number
                    .map(format::f_number)
                    .unwrap_or_else(|| format::UNKNOWN.into()),
            );
            row(
                ui,
                "ISO",
                record
                    .iso
                    .map(|iso| iso.to_string())
                    .unwrap_or_else(|| format::UNKNOWN.into()),
            );
            row(
                ui,
                "Focal Length",
                record
                    .focal_length
                    .map(format::focal_length)
                    .unwrap_or_else(|| format::UNKNOWN.into()),
            );

            section(ui, "LOCATION");
            row(
                ui,
                "Coordinates",
                match (record.latitude, record.longitude) {
                    (Some(lat), Some(lon)) => format::coordinates(lat, lon, precision),
                    _ => format::UNKNOWN.into(),
                },
            );
        });
}
