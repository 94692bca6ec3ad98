// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Dashboard Canvas Effects ("The Backdrop") - Browser Host

use std::cell::{Cell, RefCell};
use std::io;
use std::rc::Rc;
use std::sync::Once;

use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, EventTarget, HtmlCanvasElement, MouseEvent, Window};

use crate::config::{AnimationConfig, ParticleFieldConfig};
use crate::disposer::Disposer;
use crate::driver::{FrameDriver, FrameHost};
use crate::error::MountError;
use crate::geometry::{Point2, Viewport};
use crate::preferences::{PreferenceStore, Theme};
use crate::surface::DrawSurface;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

// ─── Console logging ─────────────────────────────────────────────────────────

/// Buffers one formatted event and hands it to `console.log` on drop.
#[derive(Default)]
struct ConsoleWriter {
    buf: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if !self.buf.is_empty() {
            log(String::from_utf8_lossy(&self.buf).trim_end());
        }
    }
}

static LOGGING: Once = Once::new();

/// Route `tracing` events at WARN and above to the browser console. A
/// subscriber installed by the embedding page wins.
fn init_logging() {
    LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_writer(ConsoleWriter::default)
            .with_max_level(tracing::Level::WARN)
            .without_time()
            .try_init();
    });
}

fn js_error(err: JsValue) -> MountError {
    MountError::Host(format!("{:?}", err))
}

// ─── CanvasSurface ───────────────────────────────────────────────────────────

/// `DrawSurface` over a browser 2D context.
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
}

impl DrawSurface for CanvasSurface {
    fn clear(&mut self, width: f64, height: f64) {
        self.ctx.clear_rect(0.0, 0.0, width, height);
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.ctx.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.ctx.line_to(x, y);
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64) {
        // Only fails for a negative radius; skip the arc like the canvas does.
        let _ = self.ctx.arc(x, y, radius.max(0.0), start, end);
    }

    fn close_path(&mut self) {
        self.ctx.close_path();
    }

    fn fill(&mut self) {
        self.ctx.fill();
    }

    fn stroke(&mut self) {
        self.ctx.stroke();
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        let _ = self.ctx.fill_text(text, x, y);
    }

    #[allow(deprecated)]
    fn set_fill_color(&mut self, color: &str) {
        self.ctx.set_fill_style(&JsValue::from_str(color));
    }

    #[allow(deprecated)]
    fn set_stroke_color(&mut self, color: &str) {
        self.ctx.set_stroke_style(&JsValue::from_str(color));
    }

    fn set_line_width(&mut self, width: f64) {
        self.ctx.set_line_width(width);
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.ctx.set_global_alpha(alpha);
    }

    fn set_shadow(&mut self, blur: f64, color: &str) {
        self.ctx.set_shadow_blur(blur);
        self.ctx.set_shadow_color(color);
    }

    fn set_font(&mut self, font: &str) {
        self.ctx.set_font(font);
    }
}

// ─── CanvasHost ──────────────────────────────────────────────────────────────

/// Size the canvas to its parent element, or the window when unparented.
fn fit_canvas(window: &Window, canvas: &HtmlCanvasElement) -> Viewport {
    let (width, height) = match canvas.parent_element() {
        Some(parent) => (parent.client_width() as f64, parent.client_height() as f64),
        None => (
            window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0),
            window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0),
        ),
    };
    if canvas.width() != width as u32 || canvas.height() != height as u32 {
        canvas.set_width(width as u32);
        canvas.set_height(height as u32);
    }
    Viewport::new(width, height)
}

fn listen(
    target: EventTarget,
    event: &'static str,
    handler: Box<dyn FnMut(web_sys::Event)>,
) -> Result<Disposer, MountError> {
    let closure = Closure::wrap(handler);
    target
        .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        .map_err(js_error)?;
    Ok(Disposer::new(move || {
        let _ = target.remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        drop(closure);
    }))
}

pub struct CanvasHost {
    window: Window,
    canvas: HtmlCanvasElement,
}

impl CanvasHost {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, MountError> {
        let window = web_sys::window().ok_or(MountError::SurfaceUnavailable)?;
        Ok(Self { window, canvas })
    }
}

impl FrameHost for CanvasHost {
    type Surface = CanvasSurface;

    fn acquire_surface(&mut self) -> Result<CanvasSurface, MountError> {
        let ctx = self
            .canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|obj| obj.dyn_into::<CanvasRenderingContext2d>().ok())
            .ok_or(MountError::SurfaceUnavailable)?;
        ctx.set_text_align("center");
        Ok(CanvasSurface { ctx })
    }

    fn viewport(&mut self) -> Viewport {
        fit_canvas(&self.window, &self.canvas)
    }

    fn on_resize(&mut self, mut callback: Box<dyn FnMut(Viewport)>) -> Result<Disposer, MountError> {
        let window = self.window.clone();
        let canvas = self.canvas.clone();
        listen(
            self.window.clone().into(),
            "resize",
            Box::new(move |_| callback(fit_canvas(&window, &canvas))),
        )
    }

    fn on_pointer_move(&mut self, mut callback: Box<dyn FnMut(Point2)>) -> Result<Disposer, MountError> {
        let canvas = self.canvas.clone();
        listen(
            self.window.clone().into(),
            "mousemove",
            Box::new(move |event| {
                if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
                    let rect = canvas.get_bounding_client_rect();
                    callback(Point2::new(
                        mouse.client_x() as f64 - rect.left(),
                        mouse.client_y() as f64 - rect.top(),
                    ));
                }
            }),
        )
    }

    fn start_frames(&mut self, mut callback: Box<dyn FnMut(f64)>) -> Result<Disposer, MountError> {
        // The frame closure reschedules itself through `slot`; the disposer
        // empties the slot, which stops rescheduling and frees the closure.
        let slot: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
        let pending: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));

        let (window, next, handle) = (self.window.clone(), Rc::clone(&slot), Rc::clone(&pending));
        *slot.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
            handle.set(None);
            callback(timestamp);
            if let Some(frame) = next.borrow().as_ref() {
                handle.set(window.request_animation_frame(frame.as_ref().unchecked_ref()).ok());
            }
        }) as Box<dyn FnMut(f64)>));

        let first = match slot.borrow().as_ref() {
            Some(frame) => self
                .window
                .request_animation_frame(frame.as_ref().unchecked_ref())
                .map_err(js_error)?,
            None => return Err(MountError::Host("frame callback missing".to_string())),
        };
        pending.set(Some(first));

        let window = self.window.clone();
        Ok(Disposer::new(move || {
            if let Some(id) = pending.take() {
                let _ = window.cancel_animation_frame(id);
            }
            slot.borrow_mut().take();
        }))
    }
}

// ─── JS interface ────────────────────────────────────────────────────────────

/// A mounted canvas animation, as seen from JavaScript.
#[wasm_bindgen]
pub struct CanvasAnimation {
    driver: FrameDriver,
    preferences: PreferenceStore,
}

#[wasm_bindgen]
impl CanvasAnimation {
    pub fn unmount(&mut self) {
        self.driver.unmount();
    }

    pub fn is_mounted(&self) -> bool {
        self.driver.is_mounted()
    }

    pub fn kind(&self) -> String {
        self.driver.kind().to_string()
    }

    /// Switch palette by name ("dark" or "light"); unknown names are ignored.
    pub fn set_theme(&mut self, name: &str) {
        if let Some(theme) = Theme::from_name(name) {
            self.preferences.set_theme(theme);
        }
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.preferences.set_reduced_motion(reduced);
    }

    pub fn frames_rendered(&self) -> f64 {
        self.driver.frames_rendered() as f64
    }

    /// Packet counters for the packet-flow animation, `null` otherwise.
    pub fn stats(&self) -> JsValue {
        match self.driver.flow_stats() {
            Some(stats) => serde_wasm_bindgen::to_value(&stats).unwrap_or(JsValue::NULL),
            None => JsValue::NULL,
        }
    }
}

fn try_mount(canvas: HtmlCanvasElement, options: JsValue) -> Result<CanvasAnimation, MountError> {
    let config = if options.is_undefined() || options.is_null() {
        AnimationConfig::ParticleField(ParticleFieldConfig::default())
    } else {
        serde_wasm_bindgen::from_value(options).map_err(|e| MountError::InvalidConfig(e.to_string()))?
    };
    let mut host = CanvasHost::new(canvas)?;
    let mut driver = FrameDriver::mount(&mut host, config)?;
    let preferences = PreferenceStore::default();
    driver.bind_preferences(&preferences);
    Ok(CanvasAnimation { driver, preferences })
}

/// Mount an animation on `canvas`. Returns `undefined` when the canvas has
/// no 2D context or the options are malformed; nothing is thrown.
#[wasm_bindgen]
pub fn mount_animation(canvas: HtmlCanvasElement, options: JsValue) -> Option<CanvasAnimation> {
    console_error_panic_hook::set_once();
    init_logging();
    match try_mount(canvas, options) {
        Ok(animation) => Some(animation),
        Err(err) => {
            warn!(error = %err, "animation mount aborted");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn console_writer_buffers_one_event() {
        let mut writer = ConsoleWriter::default();
        write!(writer, "animation mount aborted").unwrap();
        assert_eq!(writer.buf, b"animation mount aborted");
    }

    #[wasm_bindgen_test]
    fn logging_installs_once() {
        init_logging();
        init_logging();
        warn!("second init is a no-op");
        assert!(LOGGING.is_completed());
    }
}
