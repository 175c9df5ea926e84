use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use pyramid::session::Session;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::ui_model::FrameGate;

type FrameCallback = Closure<dyn FnMut(f64)>;

/// Drives `Session::tick` from `requestAnimationFrame` while the session has
/// work pending, and stops requesting frames once it goes idle.
pub(super) struct FramePump {
    gate: Rc<RefCell<FrameGate>>,
    callback: Rc<RefCell<Option<FrameCallback>>>,
    session: StoredValue<Session, LocalStorage>,
}

impl FramePump {
    pub(super) fn new(session: StoredValue<Session, LocalStorage>) -> Self {
        let gate = Rc::new(RefCell::new(FrameGate::default()));
        let callback: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));

        let frame_gate = Rc::clone(&gate);
        let frame_callback = Rc::clone(&callback);
        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |now: f64| {
            frame_gate.borrow_mut().begin_frame();
            let more = session
                .try_update_value(|s| {
                    s.tick(now);
                    s.needs_frames()
                })
                .unwrap_or(false);
            if frame_gate.borrow_mut().request(more) && !request_frame(&frame_callback) {
                frame_gate.borrow_mut().begin_frame();
            }
        }) as Box<dyn FnMut(f64)>));

        Self {
            gate,
            callback,
            session,
        }
    }

    /// Call after feeding input to the session.
    pub(super) fn kick(&self) {
        let needs = self.session.with_value(|s| s.needs_frames());
        if self.gate.borrow_mut().request(needs) && !request_frame(&self.callback) {
            self.gate.borrow_mut().begin_frame();
        }
    }
}

/// Returns whether a frame was actually requested.
fn request_frame(callback: &Rc<RefCell<Option<FrameCallback>>>) -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    let callback = callback.borrow();
    let Some(cb) = callback.as_ref() else {
        return false;
    };
    match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
        Ok(_) => true,
        Err(_) => {
            super::dom::console_error("requestAnimationFrame failed");
            false
        }
    }
}
