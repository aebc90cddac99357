//! Leptos application with routing.
//!
//! The signed-in session lives in one `RwSignal<AuthSession>` owned by
//! [`App`] and handed to each page as a prop.

use std::rc::Rc;

use chrono::{Datelike, Local, Utc};
use leptos::*;
use leptos_router::*;

use fleetdash_auth::{AuthSession, Credentials, HttpIdentityProvider, ResetState, UserProfile};
use fleetdash_reports::MonthlyReportClient;

use crate::frontend::components::{NoticeList, ReportPanel};
use crate::{DashboardConfig, Notifications, ReportsPage, ReportsView, ResetPasswordPage};

/// Remote services shared by every page.
#[derive(Clone)]
pub struct Services {
    pub provider: Rc<HttpIdentityProvider>,
    pub reports: Rc<MonthlyReportClient>,
}

impl Services {
    pub fn connect(config: &DashboardConfig) -> Result<Self, String> {
        let provider = HttpIdentityProvider::new(config.provider.clone()).map_err(|e| e.to_string())?;
        let reports = MonthlyReportClient::new(config.api_url.clone()).map_err(|e| e.to_string())?;
        Ok(Self {
            provider: Rc::new(provider),
            reports: Rc::new(reports),
        })
    }
}

/// Main application component.
#[component]
pub fn App() -> impl IntoView {
    let services = match DashboardConfig::from_build_env()
        .map_err(|e| e.to_string())
        .and_then(|config| Services::connect(&config))
    {
        Ok(services) => services,
        Err(message) => {
            return view! { <p class="fatal">{format!("Configuration error: {message}")}</p> }
                .into_view();
        }
    };

    let session = create_rw_signal(AuthSession::signed_out());
    let notices = create_rw_signal(Notifications::default());
    let (login_services, reports_services, reset_services) =
        (services.clone(), services.clone(), services);

    view! {
        <Router>
            <NoticeList notices=notices/>
            <Routes>
                <Route path="/" view=|| view! { <Redirect path="/reports"/> }/>
                <Route
                    path="/login"
                    view=move || view! { <LoginPage services=login_services.clone() session=session notices=notices/> }
                />
                <Route
                    path="/reports"
                    view=move || view! { <ReportsScreen services=reports_services.clone() session=session/> }
                />
                <Route
                    path="/reset-password"
                    view=move || view! { <ResetPasswordScreen services=reset_services.clone() notices=notices/> }
                />
            </Routes>
        </Router>
    }
    .into_view()
}

#[component]
fn LoginPage(
    services: Services,
    session: RwSignal<AuthSession>,
    notices: RwSignal<Notifications>,
) -> impl IntoView {
    let email = create_rw_signal(String::new());
    let password = create_rw_signal(String::new());
    let busy = create_rw_signal(false);
    let navigate = use_navigate();

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        busy.set(true);

        let provider = services.provider.clone();
        let navigate = navigate.clone();
        let credentials = Credentials::new(email.get_untracked(), password.get_untracked());
        spawn_local(async move {
            let mut auth = session.get_untracked();
            let result = auth.sign_in(&*provider, &credentials).await.map(|_| ());
            match result {
                Ok(()) => {
                    session.set(auth);
                    navigate("/reports", Default::default());
                }
                Err(e) => notices.update(|n| {
                    n.error(e.to_string(), Utc::now());
                }),
            }
            busy.set(false);
        });
    };

    view! {
        <div class="login">
            <h1>"Sign in"</h1>
            <form on:submit=on_submit>
                <input
                    type="email"
                    placeholder="Email"
                    prop:value=move || email.get()
                    on:input=move |ev| email.set(event_target_value(&ev))
                />
                <input
                    type="password"
                    placeholder="Password"
                    prop:value=move || password.get()
                    on:input=move |ev| password.set(event_target_value(&ev))
                />
                <button type="submit" disabled=move || busy.get()>"Sign in"</button>
            </form>
        </div>
    }
}

#[component]
fn ReportsScreen(services: Services, session: RwSignal<AuthSession>) -> impl IntoView {
    let page = create_rw_signal(session.with_untracked(ReportsPage::new));
    create_effect(move |_| session.with(|s| page.update(|p| p.refresh(s))));

    let today = Local::now().date_naive();
    let period = create_rw_signal((today.year(), today.month()));
    let navigate = use_navigate();

    let provider = services.provider.clone();
    let on_sign_out = move |_: ev::MouseEvent| {
        let provider = provider.clone();
        let navigate = navigate.clone();
        spawn_local(async move {
            let mut auth = session.get_untracked();
            if let Err(e) = auth.sign_out(&*provider).await {
                tracing::warn!(error = %e, "remote sign-out failed");
            }
            session.set(auth);
            navigate("/login", Default::default());
        });
    };

    let reports = services.reports;
    view! {
        <div class="reports">
            <header>
                <h1>"Reports"</h1>
                <span class="user">
                    {move || session.with(|s| s.profile().map(UserProfile::display_name))}
                </span>
                <input
                    type="month"
                    prop:value=move || {
                        let (year, month) = period.get();
                        format!("{year:04}-{month:02}")
                    }
                    on:change=move |ev| {
                        if let Some(next) = parse_month(&event_target_value(&ev)) {
                            period.set(next);
                        }
                    }
                />
                <Show
                    when=move || session.with(AuthSession::is_authenticated)
                    fallback=|| view! { <A href="/login">"Sign in"</A> }
                >
                    <button on:click=on_sign_out.clone()>"Sign out"</button>
                </Show>
            </header>
            {move || match page.with(ReportsPage::view) {
                ReportsView::Empty { message } => {
                    view! { <p class="empty-state">{message}</p> }.into_view()
                }
                ReportsView::Tabs { tabs, active } => {
                    let client = reports.clone();
                    view! {
                        <nav class="tabs">
                            {tabs
                                .into_iter()
                                .map(|tab| {
                                    let category = tab.category;
                                    view! {
                                        <button
                                            class="tab"
                                            class:active=tab.active
                                            on:click=move |_| page.update(|p| {
                                                if let Err(e) = p.select(category) {
                                                    tracing::warn!(error = %e, "tab selection refused");
                                                }
                                            })
                                        >
                                            {tab.label}
                                        </button>
                                    }
                                })
                                .collect_view()}
                        </nav>
                        {active.map(|category| view! {
                            <ReportPanel category=category client=client session=session period=period.into()/>
                        })}
                    }
                    .into_view()
                }
            }}
        </div>
    }
}

#[component]
fn ResetPasswordScreen(services: Services, notices: RwSignal<Notifications>) -> impl IntoView {
    let page = create_rw_signal(ResetPasswordPage::new());
    let password = create_rw_signal(String::new());
    let navigate = use_navigate();
    let provider = services.provider;

    {
        let provider = provider.clone();
        spawn_local(async move {
            let url = window().location().href().unwrap_or_default();
            let mut current = page.get_untracked();
            current.mount(&*provider, &url).await;
            page.set(current);
        });
    }

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        if !page.try_update(ResetPasswordPage::begin_submit).unwrap_or(false) {
            return;
        }

        let provider = provider.clone();
        let navigate = navigate.clone();
        let new_password = password.get_untracked();
        spawn_local(async move {
            let mut current = page.get_untracked();
            let route = current
                .finish_submit(&*provider, &new_password, Utc::now())
                .await;
            let now = Utc::now();
            notices.update(|all| {
                for notice in current.notifications.drain() {
                    all.push(notice.level, notice.message, now);
                }
            });
            page.set(current);
            if let Some(route) = route {
                navigate(route, Default::default());
            }
        });
    };

    view! {
        <div class="reset-password">
            <h1>"Choose a new password"</h1>
            <Show
                when=move || page.with(ResetPasswordPage::shows_form)
                fallback=|| view! { <p>"Checking your reset link..."</p> }
            >
                <form on:submit=on_submit.clone()>
                    <input
                        type="password"
                        placeholder="New password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <button type="submit" disabled=move || page.with(ResetPasswordPage::submit_disabled)>
                        {move || {
                            if page.with(|p| p.state() == ResetState::Submitting) {
                                "Updating..."
                            } else {
                                "Update password"
                            }
                        }}
                    </button>
                </form>
            </Show>
        </div>
    }
}

/// `YYYY-MM` from an `<input type="month">`.
fn parse_month(raw: &str) -> Option<(i32, u32)> {
    let (year, month) = raw.split_once('-')?;
    let month = month.parse().ok().filter(|m| (1..=12).contains(m))?;
    Some((year.parse().ok()?, month))
}
