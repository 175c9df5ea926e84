use std::rc::Rc;

use leptos::prelude::*;
use pyramid::config::PyramidConfig;
use pyramid::hover::LiftTarget;
use pyramid::list::ListGroup;
use pyramid::scene::{svg_points, AvatarIcon, SceneItem};
use pyramid::session::{Reaction, Session};
use pyramid::store::{Change, HoveredProfile};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::ui_model::{row_class, SearchKey, SearchPanel, BUNDLED_ROSTER};

mod dom;
mod frame;

use frame::FramePump;

pub fn start() {
    let session = match Session::from_json(BUNDLED_ROSTER, PyramidConfig::default()) {
        Ok(session) => session,
        Err(e) => {
            dom::console_error(&format!("pyramid: failed to load roster: {e}"));
            let message = format!("Could not load loyalists: {e}");
            mount_to_body(move || view! { <p class="load-error">{message}</p> });
            return;
        }
    };
    mount_to_body(move || view! { <App session /> });
}

/// Run `f` on the next animation frame, after the DOM has settled.
fn after_frame(f: impl FnOnce() + 'static) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let cb = Closure::once_into_js(f);
    if window.request_animation_frame(cb.unchecked_ref()).is_err() {
        dom::console_error("requestAnimationFrame failed");
    }
}

/// Everything a component needs to talk to the running session.
#[derive(Clone, Copy)]
struct Handles {
    session: StoredValue<Session, LocalStorage>,
    pump: StoredValue<FramePump, LocalStorage>,
    generations: ReadSignal<f64>,
    hovered: ReadSignal<Option<HoveredProfile>>,
    query: ReadSignal<String>,
    list_scroll: WriteSignal<u64>,
}

impl Handles {
    /// Hover/search input: may ask the list to scroll.
    fn apply(self, f: impl FnOnce(&mut Session) -> Reaction) {
        let reaction = self.session.try_update_value(f).unwrap_or_default();
        if reaction.scroll_list {
            self.list_scroll.update(|n| *n += 1);
        }
        self.kick();
    }

    /// Wheel/touch input.
    fn input(self, f: impl FnOnce(&mut Session)) {
        self.session.update_value(f);
        self.kick();
    }

    fn kick(self) {
        self.pump.with_value(FramePump::kick);
    }
}

#[component]
fn App(session: Session) -> impl IntoView {
    let store = session.store().clone();
    let (generations, set_generations) = signal(store.generations());
    let (hovered, set_hovered) = signal(store.hovered());
    let (query, set_query) = signal(store.search_query());
    let (list_scroll, set_list_scroll) = signal(0u64);

    // Mirror the store into signals; views re-render from these.
    let mirror = store.clone();
    let subscription = store.subscribe(Rc::new(move |change| match change {
        Change::Generations => set_generations.set(mirror.generations()),
        Change::Hovered => set_hovered.set(mirror.hovered()),
        Change::SearchQuery => set_query.set(mirror.search_query()),
    }));

    let session = StoredValue::new_local(session);
    let _subscription = StoredValue::new_local(subscription);
    let pump = StoredValue::new_local(FramePump::new(session));

    let handles = Handles {
        session,
        pump,
        generations,
        hovered,
        query,
        list_scroll: set_list_scroll,
    };

    view! {
        <div class="app">
            <Pyramid handles />
            <LoyalistList handles list_scroll />
        </div>
    }
}

#[component]
fn Pyramid(handles: Handles) -> impl IntoView {
    let view_box = handles.session.with_value(|s| {
        let (x, y, w, h) = s.config().geometry.view_box;
        format!("{x} {y} {w} {h}")
    });

    let on_wheel = move |ev: web_sys::WheelEvent| {
        ev.prevent_default();
        let now = dom::now_ms();
        handles.input(|s| s.wheel(ev.delta_y(), now));
    };

    let on_touch_start = move |ev: web_sys::TouchEvent| {
        let touches = ev.touches();
        let count = touches.length() as usize;
        let Some(first) = touches.get(0) else {
            return;
        };
        let on_avatar = dom::avatar_at_target(ev.target());
        handles.input(|s| {
            s.touch_start(
                count,
                first.identifier(),
                first.client_y() as f64,
                on_avatar.as_ref().map(|(g, u)| (*g, u.as_str())),
            )
        });
    };

    let on_touch_move = move |ev: web_sys::TouchEvent| {
        let touches = ev.touches();
        let count = touches.length() as usize;
        let Some(first) = touches.get(0) else {
            return;
        };
        ev.prevent_default();
        handles.input(|s| s.touch_move(count, first.client_y() as f64));
    };

    let on_touch_end = move |ev: web_sys::TouchEvent| {
        let Some(lifted) = ev.changed_touches().get(0) else {
            handles.input(Session::touch_cancel);
            return;
        };
        let over = dom::avatar_at_point(lifted.client_x() as f64, lifted.client_y() as f64);
        let lift = match over.as_deref() {
            Some(username) => LiftTarget::Icon(username),
            None => LiftTarget::Nothing,
        };
        handles.apply(|s| s.touch_end(lifted.identifier(), lift));
    };

    view! {
        <div class="pyramid-stage">
            <div
                class="pyramid-frame"
                style="touch-action: none; overscroll-behavior: contain;"
                on:wheel=on_wheel
                on:touchstart=on_touch_start
                on:touchmove=on_touch_move
                on:touchend=on_touch_end
                on:touchcancel=move |_| handles.input(Session::touch_cancel)
            >
                <svg viewBox=view_box class="pyramid-svg" preserveAspectRatio="xMidYMid meet">
                    {move || {
                        handles.generations.track();
                        handles.hovered.track();
                        let scene = handles.session.with_value(|s| s.scene());
                        scene
                            .items
                            .into_iter()
                            .map(|item| scene_item(item, handles))
                            .collect_view()
                    }}
                </svg>
            </div>
        </div>
    }
}

fn scene_item(item: SceneItem, handles: Handles) -> AnyView {
    match item {
        SceneItem::Segment(shape) => view! {
            <polygon
                points=svg_points(&shape.points)
                fill="rgb(40, 40, 40)"
                opacity="0.3"
                stroke="white"
                stroke-width="1"
            />
        }
        .into_any(),
        SceneItem::BaseLine(line) => view! {
            <line
                x1=line.from.0
                y1=line.from.1
                x2=line.to.0
                y2=line.to.1
                stroke="white"
                stroke-width="2"
                opacity="0.9"
            />
        }
        .into_any(),
        SceneItem::Avatar(icon) => view! { <Avatar icon handles /> }.into_any(),
        SceneItem::Label(label) => view! {
            <text
                x=label.x
                y=label.y
                fill="rgba(255, 255, 255, 0.9)"
                text-anchor="start"
                dominant-baseline="middle"
                opacity="0.9"
                style="font-size: 28px; pointer-events: none;"
            >
                {label.text}
            </text>
        }
        .into_any(),
        SceneItem::Outline(points) => view! {
            <polygon
                points=svg_points(&points)
                fill="none"
                stroke="white"
                stroke-width="4"
                opacity="0.9"
            />
        }
        .into_any(),
    }
}

#[component]
fn Avatar(icon: AvatarIcon, handles: Handles) -> impl IntoView {
    let AvatarIcon {
        placement,
        href,
        opacity,
        grayscale,
        ring_radius,
    } = icon;
    let generation = placement.generation;
    let (cx, cy, size) = (placement.cx, placement.cy, placement.size);
    let half = size / 2.0;

    let enter_name = placement.username.clone();
    let click_name = placement.username.clone();
    let image_style = format!(
        "clip-path: circle(50%); transition: opacity 0.2s ease-in-out, filter 0.2s ease-in-out; filter: {};",
        if grayscale { "grayscale(100%)" } else { "none" }
    );

    view! {
        <g
            role="button"
            tabindex="0"
            data-pfp="1"
            data-username=placement.username
            data-gen=generation
            style="cursor: pointer;"
            on:mouseenter=move |_| handles.apply(|s| s.hover_avatar(generation, &enter_name))
            on:mouseleave=move |_| handles.apply(Session::leave)
            on:click=move |ev| {
                ev.stop_propagation();
                handles.apply(|s| s.click_avatar(generation, &click_name));
            }
        >
            <image
                href=href
                x=cx - half
                y=cy - half
                width=size
                height=size
                preserveAspectRatio="xMidYMid slice"
                opacity=opacity
                style=image_style
            />
            {ring_radius
                .map(|r| {
                    view! {
                        <circle
                            cx=cx
                            cy=cy
                            r=r
                            fill="none"
                            stroke="rgb(59, 130, 246)"
                            stroke-width="3"
                        />
                    }
                })}
        </g>
    }
}

#[component]
fn LoyalistList(handles: Handles, list_scroll: ReadSignal<u64>) -> impl IntoView {
    let container = NodeRef::<leptos::html::Div>::new();
    let search_input = NodeRef::<leptos::html::Input>::new();
    let (panel, set_panel) = signal(SearchPanel::default());
    let title = handles.session.with_value(|s| s.list_view().title());

    Effect::new(move |_| {
        if list_scroll.get() == 0 {
            return;
        }
        let Some(hovered) = handles.hovered.get_untracked() else {
            return;
        };
        let Some(el) = container.get_untracked() else {
            return;
        };
        after_frame(move || {
            // A filtered-out row has nothing to scroll to.
            if let Err(e) = dom::scroll_row_into_view(&el, hovered.generation, &hovered.username) {
                dom::console_debug(&e);
            }
        });
    });

    let open_search = move |_| {
        set_panel.update(SearchPanel::open);
        after_frame(move || {
            if let Some(input) = search_input.get_untracked() {
                let _ = input.focus();
            }
        });
    };

    let close_search = move || {
        set_panel.update(SearchPanel::close);
        handles.apply(|s| s.set_search_query("", dom::now_ms()));
    };

    view! {
        <div class="list-panel">
            <div class="list-header">
                <div class=move || panel.get().title_class()>
                    <h2>{title}</h2>
                    <button
                        class="icon-button"
                        title="Search loyalists"
                        aria-label="Search loyalists"
                        on:click=open_search
                    >
                        "🔍"
                    </button>
                </div>
                <div class=move || panel.get().search_class()>
                    <input
                        node_ref=search_input
                        type="text"
                        placeholder="Search loyalists..."
                        prop:value=move || handles.query.get()
                        on:input=move |ev| {
                            let value = event_target_value(&ev);
                            handles.apply(|s| s.set_search_query(&value, dom::now_ms()));
                        }
                        on:keydown=move |ev: web_sys::KeyboardEvent| {
                            let mut p = panel.get_untracked();
                            if p.on_key(&ev.key()) == SearchKey::Close {
                                close_search();
                            }
                        }
                    />
                    <button
                        class="icon-button"
                        title="Close search"
                        aria-label="Close search"
                        on:click=move |_| close_search()
                    >
                        "✕"
                    </button>
                </div>
            </div>
            <div node_ref=container class="list-scroll">
                {move || {
                    handles.query.track();
                    handles.hovered.track();
                    let list = handles.session.with_value(|s| s.list_view());
                    list.groups
                        .into_iter()
                        .map(|group| view! { <ListBlock group handles /> })
                        .collect_view()
                }}
            </div>
        </div>
    }
}

#[component]
fn ListBlock(group: ListGroup, handles: Handles) -> impl IntoView {
    let generation = group.generation;
    let title = group.title();
    let count = group.count_label();

    view! {
        <div class="list-block" data-gen-container=generation>
            <div class="list-block-header" data-gen-header="">
                <h3>{title}</h3>
                <p>{count}</p>
            </div>
            <div class="list-rows">
                {group
                    .rows
                    .into_iter()
                    .map(|row| {
                        let enter_name = row.username.clone();
                        let click_name = row.username.clone();
                        let handle = row.handle();
                        let link_title = format!("Open {handle} on X");
                        view! {
                            <div
                                role="button"
                                tabindex="0"
                                class=row_class(row.hovered)
                                data-gen=generation
                                data-username=row.username
                                on:mouseenter=move |_| {
                                    handles.apply(|s| s.hover_list_row(generation, &enter_name, dom::now_ms()))
                                }
                                on:click=move |_| {
                                    let now = dom::now_ms();
                                    handles.apply(|s| s.click_list_row(generation, &click_name, now))
                                }
                                on:mouseleave=move |_| handles.apply(Session::leave)
                            >
                                <img class="list-avatar" src=row.avatar alt=handle.clone() />
                                <div class="list-names">
                                    <p class="list-display-name">{row.display_name}</p>
                                    <p class="list-handle">{handle}</p>
                                </div>
                                <a
                                    class="icon-button"
                                    href=row.profile_url
                                    target="_blank"
                                    rel="noopener noreferrer"
                                    title=link_title.clone()
                                    aria-label=link_title
                                    on:click=|ev| ev.stop_propagation()
                                >
                                    "𝕏"
                                </a>
                            </div>
                        }
                    })
                    .collect_view()}
            </div>
        </div>
    }
}
