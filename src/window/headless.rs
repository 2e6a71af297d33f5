//! In-memory windowing surface.

use std::collections::BTreeMap;

use super::{BufferId, BufferKind, EditorSize, FloatGeometry, Surface, WindowId};
use crate::error::FloatTermError;
use crate::Result;

#[derive(Debug, Clone)]
struct Buffer {
    kind: BufferKind,
    lines: Vec<String>,
}

/// Surface that keeps buffers and windows in memory.
///
/// Used by the console host, which renders the visible window itself, and by
/// tests that need to inspect what would be on screen.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    size: EditorSize,
    buffers: BTreeMap<BufferId, Buffer>,
    windows: BTreeMap<WindowId, (BufferId, FloatGeometry)>,
    next_buffer: u64,
    next_window: u64,
}

impl HeadlessSurface {
    /// Create a surface with the default editor size (24x80).
    pub fn new() -> Self {
        Self::with_size(EditorSize::default())
    }

    /// Create a surface with the given editor size.
    pub fn with_size(size: EditorSize) -> Self {
        Self {
            size,
            buffers: BTreeMap::new(),
            windows: BTreeMap::new(),
            next_buffer: 1,
            next_window: 1000,
        }
    }

    /// Change the editor size (simulates a host resize).
    pub fn set_size(&mut self, size: EditorSize) {
        self.size = size;
    }

    /// Windows currently open, in opening order.
    pub fn open_windows(&self) -> Vec<WindowId> {
        self.windows.keys().copied().collect()
    }

    /// Buffer shown by a window.
    pub fn window_buffer(&self, window: WindowId) -> Option<BufferId> {
        self.windows.get(&window).map(|(buffer, _)| *buffer)
    }

    /// Geometry a window was opened with.
    pub fn window_geometry(&self, window: WindowId) -> Option<&FloatGeometry> {
        self.windows.get(&window).map(|(_, geometry)| geometry)
    }

    /// Contents of a buffer.
    pub fn lines(&self, buffer: BufferId) -> Option<&[String]> {
        self.buffers.get(&buffer).map(|b| b.lines.as_slice())
    }

    /// Kind of a buffer.
    pub fn buffer_kind(&self, buffer: BufferId) -> Option<BufferKind> {
        self.buffers.get(&buffer).map(|b| b.kind)
    }

    /// Number of live buffers.
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Render the given window as plain text: title line followed by content.
    pub fn render(&self, window: WindowId) -> Option<String> {
        let (buffer, geometry) = self.windows.get(&window)?;
        let lines = self.lines(*buffer)?;

        let mut out = String::new();
        let title = geometry.title.as_deref().unwrap_or("");
        out.push_str(&format!("+-- {} ", title));
        out.push_str(&"-".repeat(usize::from(geometry.width).saturating_sub(title.len() + 5)));
        out.push('\n');
        let (rows, cols) = geometry.inner_size();
        let start = lines.len().saturating_sub(usize::from(rows));
        for line in &lines[start..] {
            let clipped: String = line.chars().take(usize::from(cols)).collect();
            out.push_str("| ");
            out.push_str(&clipped);
            out.push('\n');
        }
        Some(out)
    }

    fn buffer_mut(&mut self, buffer: BufferId) -> Result<&mut Buffer> {
        self.buffers
            .get_mut(&buffer)
            .ok_or_else(|| FloatTermError::Surface(format!("invalid buffer {}", buffer)))
    }
}

impl Surface for HeadlessSurface {
    fn editor_size(&self) -> EditorSize {
        self.size
    }

    fn create_buffer(&mut self, kind: BufferKind) -> Result<BufferId> {
        let id = BufferId::from_raw(self.next_buffer);
        self.next_buffer += 1;
        self.buffers.insert(
            id,
            Buffer {
                kind,
                lines: Vec::new(),
            },
        );
        Ok(id)
    }

    fn buffer_exists(&self, buffer: BufferId) -> bool {
        self.buffers.contains_key(&buffer)
    }

    fn set_lines(&mut self, buffer: BufferId, lines: &[String]) -> Result<()> {
        self.buffer_mut(buffer)?.lines = lines.to_vec();
        Ok(())
    }

    fn append_lines(&mut self, buffer: BufferId, lines: &[String]) -> Result<()> {
        self.buffer_mut(buffer)?.lines.extend_from_slice(lines);
        Ok(())
    }

    fn delete_buffer(&mut self, buffer: BufferId) -> Result<()> {
        if self.buffers.remove(&buffer).is_none() {
            return Err(FloatTermError::Surface(format!("invalid buffer {}", buffer)));
        }
        self.windows.retain(|_, (shown, _)| *shown != buffer);
        Ok(())
    }

    fn open_window(&mut self, buffer: BufferId, geometry: &FloatGeometry) -> Result<WindowId> {
        if !self.buffers.contains_key(&buffer) {
            return Err(FloatTermError::Surface(format!("invalid buffer {}", buffer)));
        }
        let id = WindowId::from_raw(self.next_window);
        self.next_window += 1;
        self.windows.insert(id, (buffer, geometry.clone()));
        Ok(id)
    }

    fn window_exists(&self, window: WindowId) -> bool {
        self.windows.contains_key(&window)
    }

    fn close_window(&mut self, window: WindowId) -> Result<()> {
        self.windows
            .remove(&window)
            .map(|_| ())
            .ok_or_else(|| FloatTermError::Surface(format!("invalid window {}", window)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::FloatStyle;

    fn geometry() -> FloatGeometry {
        FloatGeometry::centered(EditorSize::default(), &FloatStyle::default())
    }

    #[test]
    fn test_buffer_lifecycle() {
        let mut surface = HeadlessSurface::new();
        let buf = surface.create_buffer(BufferKind::Scratch).unwrap();
        assert!(surface.buffer_exists(buf));
        assert_eq!(surface.buffer_kind(buf), Some(BufferKind::Scratch));

        surface.append_lines(buf, &["one".into()]).unwrap();
        surface.append_lines(buf, &["two".into()]).unwrap();
        assert_eq!(surface.lines(buf).unwrap(), ["one", "two"]);

        surface.set_lines(buf, &["fresh".into()]).unwrap();
        assert_eq!(surface.lines(buf).unwrap(), ["fresh"]);

        surface.delete_buffer(buf).unwrap();
        assert!(!surface.buffer_exists(buf));
        assert!(surface.append_lines(buf, &["late".into()]).is_err());
    }

    #[test]
    fn test_window_lifecycle() {
        let mut surface = HeadlessSurface::new();
        let buf = surface.create_buffer(BufferKind::Terminal).unwrap();
        let win = surface.open_window(buf, &geometry()).unwrap();

        assert!(surface.window_exists(win));
        assert_eq!(surface.window_buffer(win), Some(buf));
        assert_eq!(surface.open_windows(), vec![win]);

        surface.close_window(win).unwrap();
        assert!(!surface.window_exists(win));
        assert!(surface.buffer_exists(buf));
        assert!(surface.close_window(win).is_err());
    }

    #[test]
    fn test_delete_buffer_closes_windows() {
        let mut surface = HeadlessSurface::new();
        let buf = surface.create_buffer(BufferKind::Scratch).unwrap();
        let win = surface.open_window(buf, &geometry()).unwrap();

        surface.delete_buffer(buf).unwrap();
        assert!(!surface.window_exists(win));
    }

    #[test]
    fn test_open_on_missing_buffer() {
        let mut surface = HeadlessSurface::new();
        assert!(surface
            .open_window(BufferId::from_raw(99), &geometry())
            .is_err());
    }

    #[test]
    fn test_render() {
        let mut surface = HeadlessSurface::new();
        let buf = surface.create_buffer(BufferKind::Scratch).unwrap();
        surface.append_lines(buf, &["hello".into()]).unwrap();
        let win = surface
            .open_window(buf, &geometry().with_title("Run: echo"))
            .unwrap();

        let text = surface.render(win).unwrap();
        assert!(text.starts_with("+-- Run: echo"));
        assert!(text.contains("| hello"));
    }
}
