use std::cell::{Cell, RefCell};
use std::rc::Rc;

use challenge_core::quiz::QuizBank;
use challenge_core::{ChallengeConfig, ChallengeKind, ChallengeResult, CompletionGate};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement, KeyboardEvent, MouseEvent,
    Window,
};

mod canvas;
mod constants;
mod state;
mod utils;
mod views;

use constants::CANVAS_ID;
use state::{Listeners, RAF_RUNNING, STATE, State, with_state};
use utils::{
    asset_url, event_canvas_coords, fetch_text_with_fallbacks, get_query_param, init_logging, log,
    now_ms, sync_canvas_size,
};
use views::Pointer;

/// What the host asked for, from query parameters or `mount` arguments.
struct MountRequest {
    canvas_id: String,
    kind: ChallengeKind,
    config: ChallengeConfig,
    seed: u64,
    on_complete: Option<js_sys::Function>,
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or("no window")?;
    let search = window.location().search().unwrap_or_default();
    let level = match get_query_param(&search, "log").as_deref() {
        Some("debug") => log::LevelFilter::Debug,
        Some("trace") => log::LevelFilter::Trace,
        _ => log::LevelFilter::Info,
    };
    init_logging(level);

    let document = window.document().ok_or("no document")?;
    // Hosts without a #cv canvas call `mount` themselves.
    if document.get_element_by_id(CANVAS_ID).is_none() {
        return Ok(());
    }

    let slug = get_query_param(&search, "c").unwrap_or_default();
    let kind = slug.parse().unwrap_or_else(|err| {
        if !slug.is_empty() {
            log(&format!("{err}; falling back to {}", ChallengeKind::ALL[0]));
        }
        ChallengeKind::ALL[0]
    });
    let request = MountRequest {
        canvas_id: CANVAS_ID.to_string(),
        kind,
        config: ChallengeConfig {
            challenge_id: get_query_param(&search, "id").unwrap_or_default(),
            time_limit: get_query_param(&search, "limit").and_then(|v| v.parse().ok()),
        },
        seed: get_query_param(&search, "seed")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(random_seed),
        on_complete: None,
    };

    match get_query_param(&search, "bank").filter(|b| !b.is_empty()) {
        Some(bank) if kind == ChallengeKind::Quiz => {
            // Mount once the bank arrives; the built-in bank is the fallback.
            wasm_bindgen_futures::spawn_local(async move {
                let loaded = fetch_quiz_bank(&window, &bank).await;
                if let Err(err) = mount_request(request, loaded.as_ref()) {
                    log(&format!("Failed to mount quiz: {:?}", err));
                }
            });
            Ok(())
        }
        _ => mount_request(request, None),
    }
}

/// Mount a challenge into the canvas with id `canvas_id`, replacing any
/// mounted one. `on_complete(success, timeSpent, score)` is called once.
#[wasm_bindgen]
pub fn mount(
    canvas_id: &str,
    slug: &str,
    challenge_id: Option<String>,
    time_limit: Option<u32>,
    on_complete: Option<js_sys::Function>,
) -> Result<(), JsValue> {
    let kind: ChallengeKind = slug
        .parse()
        .map_err(|e: challenge_core::ChallengeError| JsValue::from_str(&e.to_string()))?;
    mount_request(
        MountRequest {
            canvas_id: canvas_id.to_string(),
            kind,
            config: ChallengeConfig {
                challenge_id: challenge_id.unwrap_or_default(),
                time_limit,
            },
            seed: random_seed(),
            on_complete,
        },
        None,
    )
}

/// Tear down the mounted challenge. Pending timers are dropped and the
/// completion callback will not fire.
#[wasm_bindgen]
pub fn unmount() {
    let Some(rc) = STATE.with(|st| st.borrow_mut().take()) else {
        return;
    };
    let mut s = rc.borrow_mut();
    s.widget.unmount();
    detach_listeners(&s);
    log::debug!("unmounted {}", s.widget.title());
}

fn random_seed() -> u64 {
    (js_sys::Math::random() * u32::MAX as f64) as u64
}

async fn fetch_quiz_bank(window: &Window, name: &str) -> Option<QuizBank> {
    let text = fetch_text_with_fallbacks(
        window,
        &[
            &asset_url(&format!("quiz/{}.json", name)),
            &format!("/quiz/{}.json", name),
            &format!("quiz/{}.json", name),
        ],
    )
    .await?;
    match QuizBank::from_json(&text) {
        Ok(bank) => Some(bank),
        Err(err) => {
            log(&format!("Quiz bank '{}' rejected: {}", name, err));
            None
        }
    }
}

fn mount_request(req: MountRequest, bank: Option<&QuizBank>) -> Result<(), JsValue> {
    unmount();
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    let (canvas, ctx) = init_canvas(&document, &req.canvas_id)?;

    let pending: Rc<Cell<Option<ChallengeResult>>> = Rc::new(Cell::new(None));
    let sink = pending.clone();
    let gate = CompletionGate::new(Box::new(move |result| sink.set(Some(result))));
    let mut widget = views::build(req.kind, req.config, req.seed, bank, gate);
    log::info!("mounting {} with seed {}", req.kind, req.seed);

    set_text(&document, "title", widget.title());
    set_text(&document, "description", widget.description());
    set_text(&document, "timer", "");

    widget.mount(now_ms(&window));
    let state = Rc::new(RefCell::new(State {
        window,
        document,
        canvas,
        ctx,
        widget,
        listeners: Listeners {
            mouse: Vec::new(),
            keydown: None,
        },
        pending,
        on_complete: req.on_complete,
        timer_text: String::new(),
    }));
    attach_listeners(&state)?;
    STATE.with(|st| st.replace(Some(state.clone())));
    start_animation();
    Ok(())
}

fn init_canvas(
    document: &Document,
    id: &str,
) -> Result<(HtmlCanvasElement, CanvasRenderingContext2d), JsValue> {
    let cv = document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("canvas #{id} not found")))?
        .dyn_into::<HtmlCanvasElement>()?;
    let ctx = cv
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2D context not available"))?
        .dyn_into::<CanvasRenderingContext2d>()?;
    Ok((cv, ctx))
}

fn set_text(document: &Document, id: &str, text: &str) {
    if let Some(el) = document.get_element_by_id(id)
        && let Ok(el) = el.dyn_into::<HtmlElement>()
    {
        el.set_inner_text(text);
    }
}

fn attach_listeners(state: &Rc<RefCell<State>>) -> Result<(), JsValue> {
    let mut s = state.borrow_mut();
    for (name, kind) in [
        ("mousedown", Pointer::Down),
        ("mousemove", Pointer::Move),
        ("mouseup", Pointer::Up),
        ("mouseleave", Pointer::Up),
    ] {
        let cb = Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |e: MouseEvent| {
            with_state(|s| {
                let (x, y) = event_canvas_coords(&e, &s.canvas);
                let size = (s.canvas.width() as f64, s.canvas.height() as f64);
                let now = now_ms(&s.window);
                s.widget.pointer(kind, x, y, size, now);
            });
            deliver_pending();
        }));
        s.canvas
            .add_event_listener_with_callback(name, cb.as_ref().unchecked_ref())?;
        s.listeners.mouse.push((name, cb));
    }

    let keydown = Closure::<dyn FnMut(KeyboardEvent)>::wrap(Box::new(move |e: KeyboardEvent| {
        let consumed = with_state(|s| {
            let now = now_ms(&s.window);
            s.widget.key(&e.key(), now)
        })
        .unwrap_or(false);
        if consumed {
            e.prevent_default();
        }
        deliver_pending();
    }));
    s.window
        .add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
    s.listeners.keydown = Some(keydown);
    Ok(())
}

fn detach_listeners(s: &State) {
    for (name, cb) in &s.listeners.mouse {
        let _ = s
            .canvas
            .remove_event_listener_with_callback(name, cb.as_ref().unchecked_ref());
    }
    if let Some(cb) = &s.listeners.keydown {
        let _ = s
            .window
            .remove_event_listener_with_callback("keydown", cb.as_ref().unchecked_ref());
    }
}

/// Hand a reported result to the host outside of any state borrow, so the
/// host may unmount or remount from inside its callback.
fn deliver_pending() {
    let Some((result, callback)) = with_state(|s| {
        s.pending
            .take()
            .map(|r| (r, s.on_complete.clone().or_else(|| window_callback(&s.window))))
    })
    .flatten() else {
        return;
    };
    let Some(callback) = callback else {
        log(&format!(
            "challenge complete (no host callback): {}",
            serde_json::to_string(&result).unwrap_or_default()
        ));
        return;
    };
    if let Err(err) = callback.call3(
        &JsValue::NULL,
        &JsValue::from_bool(result.success),
        &JsValue::from_f64(result.time_spent as f64),
        &JsValue::from_f64(result.score as f64),
    ) {
        log(&format!("onComplete threw: {:?}", err));
    }
}

/// `window.onChallengeComplete`, when the page defines one.
fn window_callback(window: &Window) -> Option<js_sys::Function> {
    js_sys::Reflect::get(window, &JsValue::from_str("onChallengeComplete"))
        .ok()?
        .dyn_into::<js_sys::Function>()
        .ok()
}

/// One frame: advance timers, refresh the countdown and redraw.
fn frame() {
    with_state(|s| {
        let now = now_ms(&s.window);
        s.widget.tick(now);
        let timer = s
            .widget
            .remaining_secs(now)
            .map(|left| format!("{}:{:02}", left / 60, left % 60))
            .unwrap_or_default();
        if timer != s.timer_text {
            set_text(&s.document, "timer", &timer);
            s.timer_text = timer;
        }
        sync_canvas_size(&s.window, &s.canvas);
        let size = (s.canvas.width() as f64, s.canvas.height() as f64);
        s.widget.draw(&s.ctx, size, now);
    });
    deliver_pending();
}

fn start_animation() {
    if RAF_RUNNING.with(|r| r.replace(true)) {
        return;
    }
    type RafClosure = Closure<dyn FnMut(f64)>;
    let f: Rc<RefCell<Option<RafClosure>>> = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |_ts: f64| {
        if STATE.with(|st| st.borrow().is_none()) {
            // Nothing mounted: let the loop lapse and drop the closure.
            RAF_RUNNING.with(|r| r.set(false));
            f.borrow_mut().take();
            return;
        }
        frame();
        if let Some(window) = web_sys::window()
            && let Some(cb) = f.borrow().as_ref()
        {
            let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut(f64)>));
    if let Some(window) = web_sys::window()
        && let Some(cb) = g.borrow().as_ref()
    {
        let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}
