// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Dashboard Canvas Effects ("The Backdrop") - Drawing Surface Contract

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::Rc;

// ─── DrawSurface ─────────────────────────────────────────────────────────────

/// Immediate-mode 2D drawing contract.
///
/// Mirrors the subset of the HTML canvas 2D context the simulators use. Any
/// backend that can build paths, fill/stroke them, print text and honour a
/// global alpha plus shadow blur can host an animation.
pub trait DrawSurface {
    fn clear(&mut self, width: f64, height: f64);
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64);
    fn close_path(&mut self);
    fn fill(&mut self);
    fn stroke(&mut self);
    fn fill_text(&mut self, text: &str, x: f64, y: f64);

    fn set_fill_color(&mut self, color: &str);
    fn set_stroke_color(&mut self, color: &str);
    fn set_line_width(&mut self, width: f64);
    fn set_global_alpha(&mut self, alpha: f64);
    fn set_shadow(&mut self, blur: f64, color: &str);
    fn set_font(&mut self, font: &str);

    /// Stroke a single segment as its own path.
    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.begin_path();
        self.move_to(x1, y1);
        self.line_to(x2, y2);
        self.stroke();
    }

    /// Fill a full circle as its own path.
    fn circle(&mut self, x: f64, y: f64, radius: f64) {
        self.begin_path();
        self.arc(x, y, radius, 0.0, TAU);
        self.fill();
    }
}

/// Shared surfaces let a host keep a handle on what the driver draws.
impl<S: DrawSurface + ?Sized> DrawSurface for Rc<RefCell<S>> {
    fn clear(&mut self, width: f64, height: f64) {
        self.borrow_mut().clear(width, height);
    }
    fn begin_path(&mut self) {
        self.borrow_mut().begin_path();
    }
    fn move_to(&mut self, x: f64, y: f64) {
        self.borrow_mut().move_to(x, y);
    }
    fn line_to(&mut self, x: f64, y: f64) {
        self.borrow_mut().line_to(x, y);
    }
    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64) {
        self.borrow_mut().arc(x, y, radius, start, end);
    }
    fn close_path(&mut self) {
        self.borrow_mut().close_path();
    }
    fn fill(&mut self) {
        self.borrow_mut().fill();
    }
    fn stroke(&mut self) {
        self.borrow_mut().stroke();
    }
    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        self.borrow_mut().fill_text(text, x, y);
    }
    fn set_fill_color(&mut self, color: &str) {
        self.borrow_mut().set_fill_color(color);
    }
    fn set_stroke_color(&mut self, color: &str) {
        self.borrow_mut().set_stroke_color(color);
    }
    fn set_line_width(&mut self, width: f64) {
        self.borrow_mut().set_line_width(width);
    }
    fn set_global_alpha(&mut self, alpha: f64) {
        self.borrow_mut().set_global_alpha(alpha);
    }
    fn set_shadow(&mut self, blur: f64, color: &str) {
        self.borrow_mut().set_shadow(blur, color);
    }
    fn set_font(&mut self, font: &str) {
        self.borrow_mut().set_font(font);
    }
}

// ─── Recording surface ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PathOp {
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    Arc { x: f64, y: f64, radius: f64, start: f64, end: f64 },
    Close,
}

/// Style in effect when a fill, stroke or text command was issued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawStyle {
    pub fill: String,
    pub stroke: String,
    pub line_width: f64,
    pub alpha: f64,
    pub shadow_blur: f64,
    pub shadow_color: String,
    pub font: String,
}

impl Default for DrawStyle {
    fn default() -> Self {
        Self {
            fill: "#000000".to_string(),
            stroke: "#000000".to_string(),
            line_width: 1.0,
            alpha: 1.0,
            shadow_blur: 0.0,
            shadow_color: "transparent".to_string(),
            font: "10px sans-serif".to_string(),
        }
    }
}

/// One resolved drawing primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    Clear { width: f64, height: f64 },
    Fill { path: Vec<PathOp>, style: DrawStyle },
    Stroke { path: Vec<PathOp>, style: DrawStyle },
    Text { text: String, x: f64, y: f64, style: DrawStyle },
}

/// Surface that records a display list instead of rasterising.
///
/// Used headless by the bench runner and by tests to inspect what a
/// simulator drew on a given frame.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
    path: Vec<PathOp>,
    style: DrawStyle,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drop recorded commands, keeping the current style.
    pub fn reset(&mut self) {
        self.commands.clear();
        self.path.clear();
    }

    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Strokes whose path is a single straight segment, as `(from, to, alpha)`.
    pub fn segments(&self) -> Vec<((f64, f64), (f64, f64), f64)> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Stroke { path, style } => match path.as_slice() {
                    [PathOp::MoveTo { x: x1, y: y1 }, PathOp::LineTo { x: x2, y: y2 }] => {
                        Some(((*x1, *y1), (*x2, *y2), style.alpha))
                    }
                    _ => None,
                },
                _ => None,
            })
            .collect()
    }

    pub fn fill_count(&self) -> usize {
        self.commands.iter().filter(|c| matches!(c, DrawCommand::Fill { .. })).count()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl DrawSurface for RecordingSurface {
    /// A clear wipes the canvas, so the display list restarts with it.
    fn clear(&mut self, width: f64, height: f64) {
        self.commands.clear();
        self.path.clear();
        self.commands.push(DrawCommand::Clear { width, height });
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.path.push(PathOp::MoveTo { x, y });
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.path.push(PathOp::LineTo { x, y });
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64) {
        self.path.push(PathOp::Arc { x, y, radius, start, end });
    }

    fn close_path(&mut self) {
        self.path.push(PathOp::Close);
    }

    fn fill(&mut self) {
        self.commands.push(DrawCommand::Fill {
            path: self.path.clone(),
            style: self.style.clone(),
        });
    }

    fn stroke(&mut self) {
        self.commands.push(DrawCommand::Stroke {
            path: self.path.clone(),
            style: self.style.clone(),
        });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
            style: self.style.clone(),
        });
    }

    fn set_fill_color(&mut self, color: &str) {
        self.style.fill = color.to_string();
    }

    fn set_stroke_color(&mut self, color: &str) {
        self.style.stroke = color.to_string();
    }

    fn set_line_width(&mut self, width: f64) {
        self.style.line_width = width;
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.style.alpha = alpha;
    }

    fn set_shadow(&mut self, blur: f64, color: &str) {
        self.style.shadow_blur = blur;
        self.style.shadow_color = color.to_string();
    }

    fn set_font(&mut self, font: &str) {
        self.style.font = font.to_string();
    }
}
