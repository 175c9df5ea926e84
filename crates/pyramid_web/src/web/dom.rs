use pyramid::list::{scroll_target, ScrollMetrics, Span};
use wasm_bindgen::JsCast;

use crate::ui_model::{
    avatar_selector, group_header_selector, group_selector, row_selector, GENERATION_ATTR,
    USERNAME_ATTR,
};

/// Same clock as `requestAnimationFrame` timestamps.
pub(super) fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

pub(super) fn console_error(message: &str) {
    web_sys::console::error_1(&message.into());
}

pub(super) fn console_debug(message: &str) {
    web_sys::console::debug_1(&message.into());
}

/// `(generation, username)` of the avatar group containing `target`, if any.
pub(super) fn avatar_at_target(target: Option<web_sys::EventTarget>) -> Option<(usize, String)> {
    let element = target?.dyn_into::<web_sys::Element>().ok()?;
    avatar_of(&element)
}

/// Username of the avatar under a client point, if any.
pub(super) fn avatar_at_point(x: f64, y: f64) -> Option<String> {
    let document = web_sys::window()?.document()?;
    let element = document.element_from_point(x as f32, y as f32)?;
    avatar_of(&element).map(|(_, username)| username)
}

fn avatar_of(element: &web_sys::Element) -> Option<(usize, String)> {
    let group = element.closest(&avatar_selector()).ok()??;
    let username = group.get_attribute(USERNAME_ATTR)?;
    let generation = group.get_attribute(GENERATION_ATTR)?.parse().ok()?;
    Some((generation, username))
}

fn span(rect: web_sys::DomRect) -> Span {
    Span::new(rect.top(), rect.bottom())
}

/// Smoothly scrolls `container` so the row for `username` is visible.
pub(super) fn scroll_row_into_view(
    container: &web_sys::Element,
    generation: usize,
    username: &str,
) -> Result<(), String> {
    let group = container
        .query_selector(&group_selector(generation))
        .map_err(|_| "list: bad group selector".to_string())?
        .ok_or_else(|| format!("list: no block for generation {generation}"))?;
    let row = group
        .query_selector(&row_selector(username))
        .map_err(|_| "list: bad row selector".to_string())?
        .ok_or_else(|| format!("list: no row for @{username}"))?;
    let header_height = group
        .query_selector(&group_header_selector())
        .ok()
        .flatten()
        .map(|h| h.get_bounding_client_rect().height())
        .unwrap_or(0.0);

    let metrics = ScrollMetrics {
        scroll_top: container.scroll_top() as f64,
        scroll_height: container.scroll_height() as f64,
        client_height: container.client_height() as f64,
    };
    let Some(top) = scroll_target(
        span(container.get_bounding_client_rect()),
        span(group.get_bounding_client_rect()),
        span(row.get_bounding_client_rect()),
        header_height,
        metrics,
    ) else {
        return Ok(());
    };

    let options = web_sys::ScrollToOptions::new();
    options.set_top(top);
    options.set_behavior(web_sys::ScrollBehavior::Smooth);
    container.scroll_to_with_scroll_to_options(&options);
    Ok(())
}
