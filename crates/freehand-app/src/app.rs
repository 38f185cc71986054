//! Core application state: editor, library, storage and the command surface.

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::export;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use freehand_core::commands::{BACKGROUND_PALETTE, Command};
use freehand_core::element::ElementId;
use freehand_core::scene;
use freehand_core::{Canvas, Editor, FileStorage, Library, Storage, Theme};
use freehand_render::parse_color;
use std::path::Path;

/// Outcome of a command that completed.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Done,
    /// Bytes written to the given path.
    Written(usize),
    /// Background swatches to offer when no color was given.
    Palette(&'static [&'static str]),
}

/// The headless application shell.
pub struct App {
    pub editor: Editor,
    pub library: Library,
    pub config: AppConfig,
    theme: Theme,
    storage: Box<dyn Storage>,
}

impl App {
    /// Create an app on `storage`, loading the persisted library.
    ///
    /// A corrupt library document is logged and replaced by an empty one.
    pub fn new(config: AppConfig, storage: Box<dyn Storage>) -> Self {
        let library = Library::load(storage.as_ref()).unwrap_or_else(|e| {
            log::warn!("Failed to load library: {e}");
            Library::new()
        });

        let mut canvas = Canvas::new();
        canvas.set_background(config.background.clone());
        canvas.tools.locked = config.tool_lock;
        canvas.tools.settings = config.style.clone();

        Self {
            editor: Editor::new(canvas),
            library,
            theme: config.theme,
            config,
            storage,
        }
    }

    /// Create an app persisting to the configured storage directory.
    pub fn with_file_storage(config: AppConfig) -> AppResult<Self> {
        let dir = config.storage_dir();
        log::info!("Using storage directory {:?}", dir);
        let storage = FileStorage::new(dir)?;
        Ok(Self::new(config, Box::new(storage)))
    }

    pub fn canvas(&self) -> &Canvas {
        &self.editor.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.editor.canvas
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    // --- Command surface ---

    /// Run a palette command. Open, save and export take a path; background
    /// takes a color and lists the palette without one.
    pub fn execute(&mut self, command: Command, argument: Option<&str>) -> AppResult<CommandOutcome> {
        log::info!("Running command {command}");
        match command {
            Command::Open => {
                let path = argument.ok_or(AppError::MissingArgument(command.name()))?;
                self.open_file(Path::new(path))?;
                Ok(CommandOutcome::Done)
            }
            Command::Save => {
                let path = argument.ok_or(AppError::MissingArgument(command.name()))?;
                self.save_file(Path::new(path)).map(CommandOutcome::Written)
            }
            Command::Export => {
                let path = argument.ok_or(AppError::MissingArgument(command.name()))?;
                self.export_png(Path::new(path)).map(CommandOutcome::Written)
            }
            Command::Reset => {
                self.reset();
                Ok(CommandOutcome::Done)
            }
            Command::Background => match argument {
                Some(color) => {
                    self.set_background(color)?;
                    Ok(CommandOutcome::Done)
                }
                None => Ok(CommandOutcome::Palette(&BACKGROUND_PALETTE)),
            },
            Command::ThemeLight => {
                self.theme = Theme::Light;
                Ok(CommandOutcome::Done)
            }
            Command::ThemeDark => {
                self.theme = Theme::Dark;
                Ok(CommandOutcome::Done)
            }
        }
    }

    /// Replace the scene with a collection file, as one undoable step.
    pub fn open_file(&mut self, path: &Path) -> AppResult<()> {
        let json = std::fs::read_to_string(path)?;
        self.open_json(&json)?;
        log::info!("Opened {:?}", path);
        Ok(())
    }

    /// Replace the scene with a JSON collection. The scene is untouched on error.
    pub fn open_json(&mut self, json: &str) -> AppResult<()> {
        let elements = scene::deserialize(json).inspect_err(|e| log::warn!("Rejected collection: {e}"))?;
        self.editor.cancel_text();
        self.canvas_mut().load_elements(elements);
        Ok(())
    }

    /// The committed collection as pretty-printed JSON.
    pub fn save_json(&self) -> AppResult<String> {
        Ok(scene::serialize(self.canvas().store.elements())?)
    }

    pub fn save_file(&self, path: &Path) -> AppResult<usize> {
        let json = self.save_json()?;
        std::fs::write(path, &json)?;
        log::info!("Saved {} elements to {:?}", self.canvas().store.len(), path);
        Ok(json.len())
    }

    /// Write a PNG of the viewport as currently panned and zoomed.
    pub fn export_png(&self, path: &Path) -> AppResult<usize> {
        let png = export::render_viewport_png(self.canvas(), self.config.viewport)?;
        std::fs::write(path, &png)?;
        log::info!("Exported viewport to {:?}", path);
        Ok(png.len())
    }

    /// Write a PNG of all content, framed with the configured padding.
    pub fn export_content_png(&self, path: &Path) -> AppResult<usize> {
        let png = export::render_content_png(self.canvas(), self.config.export_padding)?;
        std::fs::write(path, &png)?;
        log::info!("Exported content to {:?}", path);
        Ok(png.len())
    }

    pub fn reset(&mut self) {
        self.editor.cancel_text();
        self.canvas_mut().reset();
    }

    /// Set the canvas background to a palette entry or any hex color.
    pub fn set_background(&mut self, color: &str) -> AppResult<()> {
        if parse_color(color).is_none() {
            return Err(AppError::InvalidColor(color.to_string()));
        }
        self.canvas_mut().set_background(color);
        Ok(())
    }

    // --- Images ---

    /// Read an image file as a `data:` URI.
    pub fn load_image_file(path: &Path) -> AppResult<String> {
        let bytes = std::fs::read(path)?;
        image_data_uri(&bytes)
    }

    /// Fill placeholder `element_id` with the image at `path`.
    pub fn resolve_image_file(&mut self, element_id: &str, path: &Path) -> AppResult<bool> {
        let data_uri = Self::load_image_file(path)?;
        Ok(self.editor.resolve_image(element_id, &data_uri))
    }

    // --- Library ---

    /// Save the selection as a library item and persist the library.
    pub fn save_selection_to_library(&mut self, name: &str) -> AppResult<Option<String>> {
        let store = &self.editor.canvas.store;
        let Some(item) = self.library.save_selection(store, name) else {
            return Ok(None);
        };
        let id = item.id.clone();
        self.persist_library()?;
        Ok(Some(id))
    }

    pub fn insert_library_item(&mut self, id: &str) -> Vec<ElementId> {
        self.library.insert(id, &mut self.editor.canvas.store)
    }

    pub fn delete_library_item(&mut self, id: &str) -> AppResult<bool> {
        if !self.library.delete(id) {
            return Ok(false);
        }
        self.persist_library()?;
        Ok(true)
    }

    /// Prepend the items of a library file and persist.
    pub fn import_library(&mut self, path: &Path) -> AppResult<usize> {
        let json = std::fs::read_to_string(path)?;
        let count = self
            .library
            .import_json(&json)
            .inspect_err(|e| log::warn!("Library import failed: {e}"))?;
        self.persist_library()?;
        log::info!("Imported {count} library items");
        Ok(count)
    }

    pub fn export_library(&self, path: &Path) -> AppResult<()> {
        std::fs::write(path, self.library.export_json()?)?;
        Ok(())
    }

    fn persist_library(&self) -> AppResult<()> {
        self.library
            .persist(self.storage.as_ref())
            .inspect_err(|e| log::error!("Failed to persist library: {e}"))?;
        Ok(())
    }
}

/// Encode image bytes as a base64 `data:` URI, typed by their magic bytes.
pub fn image_data_uri(bytes: &[u8]) -> AppResult<String> {
    let format = image::guess_format(bytes)?;
    Ok(format!(
        "data:{};base64,{}",
        format.to_mime_type(),
        STANDARD.encode(bytes)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use freehand_core::element::{Element, ElementKind, ElementPatch, FillStyle};
    use freehand_core::{MemoryStorage, ToolKind};
    use kurbo::Point;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    fn decode(bytes: &[u8]) -> (u32, u32, Vec<u8>) {
        let mut reader = png::Decoder::new(bytes).read_info().unwrap();
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).unwrap();
        buf.truncate(info.buffer_size());
        (info.width, info.height, buf)
    }

    fn app() -> App {
        App::new(AppConfig::default(), Box::new(MemoryStorage::new()))
    }

    fn rect(id: &str) -> Element {
        Element::create(
            id,
            ElementKind::Rectangle,
            &ElementPatch::new().with_position(Point::new(0.0, 0.0)).with_size(20.0, 20.0),
        )
    }

    #[test]
    fn test_config_applied() {
        let config = AppConfig {
            background: "#fff".to_string(),
            tool_lock: true,
            theme: Theme::Light,
            ..AppConfig::default()
        };
        let app = App::new(config, Box::new(MemoryStorage::new()));
        assert_eq!(app.canvas().background, "#fff");
        assert!(app.canvas().tools.locked);
        assert_eq!(app.theme(), Theme::Light);
    }

    #[test]
    fn test_save_and_open_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.json");

        let mut source = app();
        source.canvas_mut().store.add(rect("a"));
        source.execute(Command::Save, path.to_str()).unwrap();

        let mut target = app();
        target.execute(Command::Open, path.to_str()).unwrap();
        assert_eq!(target.canvas().store.elements(), source.canvas().store.elements());
        assert!(target.canvas().store.can_undo());
    }

    #[test]
    fn test_open_rejects_non_array() {
        let mut app = app();
        app.canvas_mut().store.add(rect("a"));
        let err = app.open_json(r#"{"id": "x"}"#).unwrap_err();
        assert_eq!(err.user_message(), "Invalid file");
        assert_eq!(app.canvas().store.len(), 1);
    }

    #[test]
    fn test_missing_argument() {
        let mut app = app();
        assert!(matches!(
            app.execute(Command::Open, None),
            Err(AppError::MissingArgument("open"))
        ));
    }

    #[test]
    fn test_reset_and_theme_commands() {
        let mut app = app();
        app.canvas_mut().store.add(rect("a"));
        app.execute(Command::Background, Some("#23242a")).unwrap();
        app.execute(Command::Reset, None).unwrap();
        assert!(app.canvas().store.is_empty());
        assert_eq!(app.canvas().background, "#000");

        app.execute(Command::ThemeLight, None).unwrap();
        assert_eq!(app.theme(), Theme::Light);
        app.execute(Command::ThemeDark, None).unwrap();
        assert_eq!(app.theme(), Theme::Dark);
    }

    #[test]
    fn test_background_palette_and_validation() {
        let mut app = app();
        assert_eq!(
            app.execute(Command::Background, None).unwrap(),
            CommandOutcome::Palette(&BACKGROUND_PALETTE)
        );
        assert!(matches!(app.set_background("blue"), Err(AppError::InvalidColor(_))));
        assert_eq!(app.canvas().background, "#000");
    }

    #[test]
    fn test_export_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.png");
        let mut app = app();
        app.canvas_mut().store.add(rect("a"));

        let written = app.execute(Command::Export, path.to_str()).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(written, CommandOutcome::Written(bytes.len()));
        let (width, height, _) = decode(&bytes);
        assert_eq!((width, height), app.config.viewport);
    }

    #[test]
    fn test_export_follows_camera() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("view.png");
        let config = AppConfig {
            viewport: (60, 60),
            ..AppConfig::default()
        };
        let mut app = App::new(config, Box::new(MemoryStorage::new()));
        let mut element = Element::create(
            "a",
            ElementKind::Rectangle,
            &ElementPatch::new()
                .with_position(Point::new(0.0, 0.0))
                .with_size(40.0, 40.0)
                .with_stroke_color("#ff0000")
                .with_fill_color("#ff0000"),
        );
        element.fill_style = FillStyle::Solid;
        app.canvas_mut().store.add(element);
        app.canvas_mut().camera.zoom = 2.0;
        app.canvas_mut().camera.pan = kurbo::Vec2::new(10.0, 10.0);

        app.export_png(&path).unwrap();
        let (width, height, pixels) = decode(&std::fs::read(&path).unwrap());
        assert_eq!((width, height), (60, 60));
        let at = |x: usize, y: usize| &pixels[(y * 60 + x) * 4..(y * 60 + x) * 4 + 4];
        // World (20, 20) lands on screen (50, 50); the left margin is the pan.
        assert_eq!(at(50, 50), &[255, 0, 0, 255]);
        assert_eq!(at(5, 5), &[0, 0, 0, 255]);
        assert_eq!(at(5, 50), &[0, 0, 0, 255]);
    }

    #[test]
    fn test_export_content_frames_elements() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("content.png");
        let mut app = app();
        app.canvas_mut().store.add(rect("a"));
        app.canvas_mut().camera.pan = kurbo::Vec2::new(500.0, 500.0);

        app.export_content_png(&path).unwrap();
        let (width, height, _) = decode(&std::fs::read(&path).unwrap());
        assert_eq!((width, height), (60, 60));
    }

    #[test]
    fn test_image_data_uri() {
        let uri = image_data_uri(PNG_MAGIC).unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));
        assert!(image_data_uri(b"plain text").is_err());
    }

    #[test]
    fn test_resolve_image_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pic.png");
        std::fs::write(&path, PNG_MAGIC).unwrap();

        let mut app = app();
        app.canvas_mut().tools.set_tool(ToolKind::Image);
        let effect = app.editor.handle_pointer(freehand_core::PointerEvent::Down {
            position: Point::new(5.0, 5.0),
            button: freehand_core::MouseButton::Left,
            modifiers: freehand_core::Modifiers::NONE,
        });
        let Some(freehand_core::Effect::RequestImage { element_id }) = effect else {
            panic!("expected image request");
        };
        assert!(app.resolve_image_file(&element_id, &path).unwrap());
    }

    #[test]
    fn test_library_persists() {
        let dir = tempfile::tempdir().unwrap();
        let storage = || Box::new(FileStorage::new(dir.path().to_path_buf()).unwrap());
        let mut app = App::new(AppConfig::default(), storage());
        app.canvas_mut().store.add(rect("a"));
        app.canvas_mut().store.select("a");

        let id = app.save_selection_to_library("square").unwrap().unwrap();
        let reloaded = App::new(AppConfig::default(), storage());
        assert_eq!(reloaded.library.len(), 1);

        let ids = app.insert_library_item(&id);
        assert_eq!(ids.len(), 1);
        assert_eq!(app.canvas().store.len(), 2);
        assert!(app.delete_library_item(&id).unwrap());
        assert!(!app.delete_library_item(&id).unwrap());
    }

    #[test]
    fn test_library_import_and_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.json");

        let mut source = app();
        source.canvas_mut().store.add(rect("a"));
        source.canvas_mut().store.select("a");
        source.save_selection_to_library("one").unwrap();
        source.export_library(&path).unwrap();

        let mut target = app();
        assert_eq!(target.import_library(&path).unwrap(), 1);

        std::fs::write(&path, "{}").unwrap();
        let err = target.import_library(&path).unwrap_err();
        assert_eq!(err.user_message(), "Import failed");
        assert_eq!(target.library.len(), 1);
    }
}
