//! Dashboard route handler.

use askama::Template;
use axum::{
    Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
};
use eventhub_core::DashboardStats;
use tracing::instrument;

use crate::{
    error::{AppError, page_message},
    filters,
    middleware::RequireSession,
    state::AppState,
};

use super::{UserView, events::EventRow, registrations::RegistrationRow, render};

/// Upcoming events shown on the dashboard.
const UPCOMING_LIMIT: u32 = 5;

/// Stat card on the dashboard.
#[derive(Debug, Clone)]
pub struct StatCard {
    pub label: &'static str,
    pub value: u64,
    pub href: &'static str,
}

/// Build the stat cards; optional counters only appear when supplied.
fn stat_cards(stats: &DashboardStats) -> Vec<StatCard> {
    let mut cards = vec![
        StatCard {
            label: "Teambuildings",
            value: stats.total_teambuildings,
            href: "/teambuildings",
        },
        StatCard {
            label: "Active teambuildings",
            value: stats.active_teambuildings,
            href: "/teambuildings?status=active",
        },
        StatCard {
            label: "Events",
            value: stats.total_events,
            href: "/events",
        },
        StatCard {
            label: "Registrations",
            value: stats.total_registrations,
            href: "/registrations",
        },
    ];
    if let Some(value) = stats.upcoming_events {
        cards.push(StatCard {
            label: "Upcoming events",
            value,
            href: "/events",
        });
    }
    if let Some(value) = stats.total_users {
        cards.push(StatCard {
            label: "Users",
            value,
            href: "/dashboard",
        });
    }
    cards
}

/// Dashboard template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub admin_user: UserView,
    pub current_path: String,
    pub error: Option<String>,
    pub cards: Vec<StatCard>,
    pub recent_registrations: Vec<RegistrationRow>,
    pub upcoming_error: Option<String>,
    pub upcoming_events: Vec<EventRow>,
}

/// Build the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard))
}

/// Dashboard page handler.
///
/// GET /dashboard
#[instrument(skip(auth, state))]
async fn dashboard(
    RequireSession(auth): RequireSession,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let api = state.api_for(&auth);

    let dashboard = api.dashboard();
    let events = api.events();
    let (stats, upcoming) = tokio::join!(dashboard.stats(), events.upcoming(UPCOMING_LIMIT));

    let (error, cards, recent_registrations) = match stats {
        Ok(stats) => (
            None,
            stat_cards(&stats),
            stats
                .recent_registrations
                .iter()
                .map(RegistrationRow::from)
                .collect(),
        ),
        Err(e) => (Some(page_message(e)?), Vec::new(), Vec::new()),
    };

    let (upcoming_error, upcoming_events) = match upcoming {
        Ok(events) => (None, events.iter().map(EventRow::from).collect()),
        Err(e) => (Some(page_message(e)?), Vec::new()),
    };

    let template = DashboardTemplate {
        admin_user: UserView::from(&auth),
        current_path: "/dashboard".to_string(),
        error,
        cards,
        recent_registrations,
        upcoming_error,
        upcoming_events,
    };

    Ok(render(&template).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_counters_add_cards() {
        let mut stats = DashboardStats::default();
        assert_eq!(stat_cards(&stats).len(), 4);

        stats.total_users = Some(12);
        stats.upcoming_events = Some(3);
        let cards = stat_cards(&stats);
        assert_eq!(cards.len(), 6);
        assert!(cards.iter().any(|c| c.label == "Users" && c.value == 12));
    }
}
