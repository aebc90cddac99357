//! Reusable view components.

use std::rc::Rc;
use std::time::Duration;

use chrono::Utc;
use leptos::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlOptionElement, HtmlSelectElement};

use fleetdash_auth::AuthSession;
use fleetdash_reports::{MonthlyReport, MonthlyReportClient, ReportCategory};

use crate::multi_select::MultiSelect as SelectModel;
use crate::pages::{Dataset, cell, columns};
use crate::{Notice, NoticeLevel, Notifications, SelectOption};

/// Native `<select multiple>` bound to a caller-owned value.
#[component]
pub fn MultiSelect(
    options: Vec<SelectOption>,
    #[prop(into)] value: Signal<Vec<String>>,
    #[prop(into)] on_change: Callback<Vec<String>>,
) -> impl IntoView {
    let handler_options = options.clone();
    let on_select = move |ev: ev::Event| {
        let select = event_target::<HtmlSelectElement>(&ev);
        let native = select.options();
        let flags: Vec<bool> = (0..native.length())
            .map(|i| {
                native
                    .item(i)
                    .and_then(|el| el.dyn_into::<HtmlOptionElement>().ok())
                    .is_some_and(|opt| opt.selected())
            })
            .collect();
        let current = value.get_untracked();
        on_change.call(SelectModel::new(&handler_options, &current).selection_from_flags(&flags));
    };

    view! {
        <select multiple=true class="multi-select" on:change=on_select>
            {options
                .into_iter()
                .map(|opt| {
                    let key = opt.value.clone();
                    view! {
                        <option
                            value=opt.value
                            prop:selected=move || value.with(|v| v.iter().any(|s| *s == key))
                        >
                            {opt.label}
                        </option>
                    }
                })
                .collect_view()}
        </select>
    }
}

/// Toast list. Notices expire on a one second tick or on click.
#[component]
pub fn NoticeList(notices: RwSignal<Notifications>) -> impl IntoView {
    set_interval(
        move || notices.update(|n| n.expire(Utc::now())),
        Duration::from_secs(1),
    );

    view! {
        <div class="notices">
            <For
                each=move || notices.with(|n| n.active().to_vec())
                key=|notice: &Notice| notice.id
                children=move |notice: Notice| {
                    let id = notice.id;
                    let class = match notice.level {
                        NoticeLevel::Success => "notice success",
                        NoticeLevel::Error => "notice error",
                    };
                    view! {
                        <div class=class on:click=move |_| notices.update(|n| n.dismiss(id))>
                            {notice.message}
                        </div>
                    }
                }
            />
        </div>
    }
}

/// One category's monthly table, with a column picker.
#[component]
pub fn ReportPanel(
    category: ReportCategory,
    client: Rc<MonthlyReportClient>,
    session: RwSignal<AuthSession>,
    period: Signal<(i32, u32)>,
) -> impl IntoView {
    let Some(dataset) = Dataset::for_category(category) else {
        return view! {
            <section class="report-panel">
                <h2>{category.label()}</h2>
                <p class="empty-state">"This report is not part of the monthly summary."</p>
            </section>
        }
        .into_view();
    };

    let report = create_local_resource(
        move || period.get(),
        move |(year, month)| {
            let client = client.clone();
            let token = session.with_untracked(|s| {
                s.require_token(Utc::now())
                    .map(str::to_string)
                    .map_err(|e| e.to_string())
            });
            async move {
                let token = token?;
                let outcome = client
                    .fetch_monthly_report(year, month, Some(&token))
                    .await
                    .map_err(|e| e.to_string())?;
                outcome.into_report().map_err(|e| e.to_string())
            }
        },
    );
    let picked = create_rw_signal(Vec::<String>::new());

    view! {
        <section class="report-panel" id=format!("report-{}", category.slug())>
            <h2>{category.label()}</h2>
            {move || match report.get() {
                None => view! { <p>"Loading..."</p> }.into_view(),
                Some(Err(message)) => view! { <p class="error">{message}</p> }.into_view(),
                Some(Ok(report)) => render_table(dataset, &report, picked),
            }}
        </section>
    }
    .into_view()
}

fn render_table(dataset: Dataset, report: &MonthlyReport, picked: RwSignal<Vec<String>>) -> View {
    let rows = dataset.rows(report).to_vec();
    if rows.is_empty() {
        return view! { <p class="empty-state">"No data for this period."</p> }.into_view();
    }

    let all = columns(&rows);
    let options: Vec<SelectOption> = all.iter().map(|c| SelectOption::new(c.clone(), c.clone())).collect();
    // An empty pick shows every column.
    let shown = move || {
        let chosen: Vec<String> = picked.get().into_iter().filter(|c| all.contains(c)).collect();
        if chosen.is_empty() { all.clone() } else { chosen }
    };
    let header = shown.clone();

    view! {
        <MultiSelect options=options value=picked on_change=move |next: Vec<String>| picked.set(next)/>
        <table>
            <thead>
                <tr>{move || header().into_iter().map(|c| view! { <th>{c}</th> }).collect_view()}</tr>
            </thead>
            <tbody>
                {move || {
                    let cols = shown();
                    rows.iter()
                        .map(|row| {
                            view! {
                                <tr>{cols.iter().map(|c| view! { <td>{cell(row, c)}</td> }).collect_view()}</tr>
                            }
                        })
                        .collect_view()
                }}
            </tbody>
        </table>
    }
    .into_view()
}
