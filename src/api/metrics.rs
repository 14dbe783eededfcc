use actix_web::HttpResponse;
use std::sync::atomic::{AtomicU64, Ordering};

static ASK_TOTAL: AtomicU64 = AtomicU64::new(0);
static ASK_ANSWERED: AtomicU64 = AtomicU64::new(0);
static ASK_NOT_UNDERSTOOD: AtomicU64 = AtomicU64::new(0);
static ASK_REJECTED: AtomicU64 = AtomicU64::new(0);
static ASK_FAILED: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy)]
pub enum AskOutcome {
    Answered,
    /// Sem JSON ou intenção desconhecida
    NotUnderstood,
    /// Comando vazio ou usuário inexistente
    Rejected,
    Failed,
}

pub fn record_ask(outcome: AskOutcome) {
    ASK_TOTAL.fetch_add(1, Ordering::Relaxed);
    let counter = match outcome {
        AskOutcome::Answered => &ASK_ANSWERED,
        AskOutcome::NotUnderstood => &ASK_NOT_UNDERSTOOD,
        AskOutcome::Rejected => &ASK_REJECTED,
        AskOutcome::Failed => &ASK_FAILED,
    };
    counter.fetch_add(1, Ordering::Relaxed);
}

fn render() -> String {
    format!(
        "# HELP assistant_asks_total Total number of commands sent to the assistant\n\
         # TYPE assistant_asks_total counter\n\
         assistant_asks_total {}\n\
         \n\
         # HELP assistant_ask_outcomes_total Commands by outcome\n\
         # TYPE assistant_ask_outcomes_total counter\n\
         assistant_ask_outcomes_total{{outcome=\"answered\"}} {}\n\
         assistant_ask_outcomes_total{{outcome=\"not_understood\"}} {}\n\
         assistant_ask_outcomes_total{{outcome=\"rejected\"}} {}\n\
         assistant_ask_outcomes_total{{outcome=\"failed\"}} {}\n",
        ASK_TOTAL.load(Ordering::Relaxed),
        ASK_ANSWERED.load(Ordering::Relaxed),
        ASK_NOT_UNDERSTOOD.load(Ordering::Relaxed),
        ASK_REJECTED.load(Ordering::Relaxed),
        ASK_FAILED.load(Ordering::Relaxed),
    )
}

#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Health",
    responses(
        (status = 200, description = "Prometheus metrics in text exposition format")
    )
)]
pub async fn get_metrics() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(render())
}
