//! The row of photos in the current window.

use image::{imageops::FilterType, DynamicImage};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};
use ratatui_image::{picker::Picker, protocol::StatefulProtocol, Resize, StatefulImage};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use camlabel::controller::WindowPhoto;

use crate::app::App;

const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %Hh%M:%S";

/// Decoded photos are downscaled to this before display.
const MAX_DECODE_SIZE: u32 = 1024;

/// Keep roughly three windows' worth of decoded photos.
const CACHE_WINDOWS: usize = 3;

/// Photos decoded off the UI thread and kept ready for the terminal's
/// graphics protocol.
pub struct ImageCache {
    picker: Picker,
    rotation: u16,
    capacity: usize,
    cache: HashMap<PathBuf, StatefulProtocol>,
    loading: HashSet<PathBuf>,
    failed: HashSet<PathBuf>,
    receiver: mpsc::Receiver<(PathBuf, Option<DynamicImage>)>,
    sender: mpsc::Sender<(PathBuf, Option<DynamicImage>)>,
}

impl ImageCache {
    /// `None` when the terminal does not answer the graphics query.
    pub fn detect(rotation: u16, window_width: usize) -> Option<Self> {
        let picker = Picker::from_query_stdio()
            .inspect_err(|e| tracing::info!(error = ?e, "No terminal graphics support"))
            .ok()?;
        let (sender, receiver) = mpsc::channel();
        Some(Self {
            picker,
            rotation,
            capacity: window_width.max(1) * CACHE_WINDOWS,
            cache: HashMap::new(),
            loading: HashSet::new(),
            failed: HashSet::new(),
            receiver,
            sender,
        })
    }

    /// Poll for completed async image loads
    pub fn poll(&mut self) {
        while let Ok((path, decoded)) = self.receiver.try_recv() {
            self.loading.remove(&path);
            match decoded {
                Some(img) => {
                    let protocol = self.picker.new_resize_protocol(img);
                    self.cache.insert(path, protocol);
                }
                None => {
                    self.failed.insert(path);
                }
            }
        }
    }

    /// Start decoding any of `paths` not already cached, dropping cached
    /// photos outside `paths` once over capacity.
    pub fn request(&mut self, paths: &[&Path]) {
        if self.cache.len() > self.capacity {
            self.cache.retain(|cached, _| paths.contains(&cached.as_path()));
        }

        for path in paths {
            if self.cache.contains_key(*path) || self.loading.contains(*path) || self.failed.contains(*path) {
                continue;
            }
            let path = path.to_path_buf();
            self.loading.insert(path.clone());
            let sender = self.sender.clone();
            let rotation = self.rotation;

            std::thread::spawn(move || {
                let decoded = match image::ImageReader::open(&path)
                    .map_err(image::ImageError::IoError)
                    .and_then(|r| r.decode())
                {
                    Ok(img) => {
                        let resized = img.resize(MAX_DECODE_SIZE, MAX_DECODE_SIZE, FilterType::Triangle);
                        Some(match rotation {
                            90 => resized.rotate90(),
                            180 => resized.rotate180(),
                            270 => resized.rotate270(),
                            _ => resized,
                        })
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Failed to decode photo");
                        None
                    }
                };
                let _ = sender.send((path, decoded));
            });
        }
    }

    fn get_mut(&mut self, path: &Path) -> Option<&mut StatefulProtocol> {
        self.cache.get_mut(path)
    }

    fn is_loading(&self, path: &Path) -> bool {
        self.loading.contains(path)
    }
}

pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let cells = app.display.width.max(app.state.photos.len()).max(1);
    let constraints = vec![Constraint::Ratio(1, cells as u32); cells];
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    if let Some(images) = app.images.as_mut() {
        images.poll();
        let paths: Vec<&Path> = app.state.photos.iter().map(|p| p.path.as_path()).collect();
        images.request(&paths);
    }

    let active_participant = app.state.participant_id;
    for (photo, cell) in app.state.photos.iter().zip(columns.iter()) {
        render_cell(frame, photo, active_participant, app.images.as_mut(), *cell);
    }
}

fn render_cell(
    frame: &mut Frame,
    photo: &WindowPhoto,
    active_participant: u32,
    images: Option<&mut ImageCache>,
    area: Rect,
) {
    let border_style = if photo.active {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let mut title = format!(" {} ", photo.timestamp.format(TIMESTAMP_FORMAT));
    if photo.participant_id != active_participant {
        title.push_str(&format!("P{} ", photo.participant_id));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(images) = images else {
        render_file_name(frame, &photo.path, inner);
        return;
    };

    if let Some(protocol) = images.get_mut(&photo.path) {
        let image = StatefulImage::new(None).resize(Resize::Fit(None));
        frame.render_stateful_widget(image, inner, protocol);
    } else if images.is_loading(&photo.path) {
        frame.render_widget(
            Paragraph::new("Loading...")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            inner,
        );
    } else {
        render_file_name(frame, &photo.path, inner);
    }
}

fn render_file_name(frame: &mut Frame, path: &Path, area: Rect) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    frame.render_widget(
        Paragraph::new(name)
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        area,
    );
}
