use std::cell::{Cell, RefCell};
use std::rc::Rc;

use challenge_core::ChallengeResult;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, KeyboardEvent, MouseEvent, Window};

use crate::views::Widget;

/// Listeners registered for one mount, kept so unmount can remove them.
pub struct Listeners {
    pub mouse: Vec<(&'static str, Closure<dyn FnMut(MouseEvent)>)>,
    pub keydown: Option<Closure<dyn FnMut(KeyboardEvent)>>,
}

/// The mounted challenge and the DOM handles it draws into.
pub struct State {
    pub window: Window,
    pub document: Document,
    pub canvas: HtmlCanvasElement,
    pub ctx: CanvasRenderingContext2d,
    pub widget: Box<dyn Widget>,
    pub listeners: Listeners,
    /// Result handed over by the completion gate, delivered to the host
    /// once the state borrow is released.
    pub pending: Rc<Cell<Option<ChallengeResult>>>,
    pub on_complete: Option<js_sys::Function>,
    /// Last countdown text written, to avoid touching the DOM every frame.
    pub timer_text: String,
}

thread_local! {
    /// Single mounted instance, shared by the DOM callbacks.
    pub static STATE: RefCell<Option<Rc<RefCell<State>>>> = const { RefCell::new(None) };
    /// Whether a requestAnimationFrame loop is currently scheduled.
    pub static RAF_RUNNING: Cell<bool> = const { Cell::new(false) };
}

/// Run `f` against the mounted state, if any.
pub fn with_state<R>(f: impl FnOnce(&mut State) -> R) -> Option<R> {
    let rc = STATE.with(|st| st.borrow().clone())?;
    let mut s = rc.borrow_mut();
    Some(f(&mut s))
}
