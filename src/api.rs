use actix_web::{delete, get, post, web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::conversation::{Conversation, PendingReply, SessionStore};
use crate::model::{MatchResult, Message, Resolution};

// --- Request / Response Bodies ---

#[derive(Deserialize)]
struct AskRequest {
    user_input: String,
}

#[derive(Serialize)]
struct AskResponse {
    response: String,
    matched: bool,
    resolution: Resolution,
}

#[derive(Serialize)]
struct FaqSummary<'a> {
    category: &'a str,
    question: &'a str,
}

#[derive(Serialize)]
struct SessionView {
    session_id: Uuid,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct PostRequest {
    text: String,
}

#[derive(Deserialize)]
struct SuggestionRequest {
    question: String,
}

#[derive(Serialize)]
struct ReplyResponse {
    reply: MatchResult,
    messages: Vec<Message>,
}

// --- Endpoints ---

#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(include_str!("index.html"))
}

/// Stateless resolution, no session involved.
#[post("/ask")]
async fn ask_endpoint(req: web::Json<AskRequest>, store: web::Data<SessionStore>) -> impl Responder {
    let result = store.resolver().resolve(&req.user_input);
    HttpResponse::Ok().json(AskResponse {
        response: result.answer,
        matched: result.matched,
        resolution: result.resolution,
    })
}

#[get("/quick-actions")]
async fn quick_actions(store: web::Data<SessionStore>) -> impl Responder {
    HttpResponse::Ok().json(store.resolver().knowledge().quick_actions())
}

#[get("/faqs")]
async fn faqs(store: web::Data<SessionStore>) -> impl Responder {
    let knowledge = store.resolver().knowledge();
    let list: Vec<FaqSummary> = knowledge
        .questions()
        .map(|(category, question)| FaqSummary { category, question })
        .collect();
    HttpResponse::Ok().json(list)
}

#[post("/sessions")]
async fn open_session(store: web::Data<SessionStore>) -> impl Responder {
    let conversation = store.open();
    HttpResponse::Created().json(SessionView {
        session_id: conversation.id(),
        messages: conversation.transcript(),
    })
}

#[get("/sessions/{id}/messages")]
async fn transcript(path: web::Path<Uuid>, store: web::Data<SessionStore>) -> impl Responder {
    match store.get(&path) {
        Some(conversation) => HttpResponse::Ok().json(conversation.transcript()),
        None => HttpResponse::NotFound().body("unknown session"),
    }
}

#[post("/sessions/{id}/messages")]
async fn post_message(
    path: web::Path<Uuid>,
    req: web::Json<PostRequest>,
    store: web::Data<SessionStore>,
) -> impl Responder {
    let Some(conversation) = store.get(&path) else {
        return HttpResponse::NotFound().body("unknown session");
    };
    let pending = conversation.post(&req.text);
    await_reply(conversation, pending).await
}

#[post("/sessions/{id}/suggestions")]
async fn select_suggestion(
    path: web::Path<Uuid>,
    req: web::Json<SuggestionRequest>,
    store: web::Data<SessionStore>,
) -> impl Responder {
    let Some(conversation) = store.get(&path) else {
        return HttpResponse::NotFound().body("unknown session");
    };
    let pending = conversation.select_suggestion(&req.question);
    await_reply(conversation, pending).await
}

#[delete("/sessions/{id}")]
async fn close_session(path: web::Path<Uuid>, store: web::Data<SessionStore>) -> impl Responder {
    if store.close(&path) {
        HttpResponse::NoContent().finish()
    } else {
        HttpResponse::NotFound().body("unknown session")
    }
}

async fn await_reply(conversation: Arc<Conversation>, pending: Option<PendingReply>) -> HttpResponse {
    let Some(pending) = pending else {
        return HttpResponse::BadRequest().body("message must not be blank");
    };
    match pending.wait().await {
        Some(reply) => HttpResponse::Ok().json(ReplyResponse {
            reply,
            messages: conversation.transcript(),
        }),
        None => HttpResponse::Gone().body("session closed before the reply"),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(index)
        .service(ask_endpoint)
        .service(quick_actions)
        .service(faqs)
        .service(open_session)
        .service(transcript)
        .service(post_message)
        .service(select_suggestion)
        .service(close_session);
}
