// src/web/conversation_handlers.rs
use crate::{
    error::AppResult,
    models::conversation::{Conversation, ConversationAtualizacao, FiltroPeriodo, NovaConversation},
    services::conversation_service,
    state::AppState,
    web::Confirmacao,
};
use axum::extract::{Json, Path, Query, State};

/// POST /turmas/{id}/conversations (cria ou reutiliza pelo nome)
pub async fn handle_criar_conversation(
    State(state): State<AppState>,
    Path(turma_id): Path<i64>,
    Json(nova): Json<NovaConversation>,
) -> AppResult<Json<Conversation>> {
    let conversa = conversation_service::criar_ou_associar(&state.db_pool, turma_id, nova).await?;
    Ok(Json(conversa))
}

pub async fn handle_listar_conversations(
    State(state): State<AppState>,
    Path(turma_id): Path<i64>,
) -> AppResult<Json<Vec<Conversation>>> {
    let conversas = conversation_service::listar_da_turma(&state.db_pool, turma_id).await?;
    Ok(Json(conversas))
}

pub async fn handle_ver_conversation(
    State(state): State<AppState>,
    Path((turma_id, conversation_id)): Path<(i64, i64)>,
) -> AppResult<Json<Conversation>> {
    let conversa =
        conversation_service::buscar_da_turma(&state.db_pool, turma_id, conversation_id).await?;
    Ok(Json(conversa))
}

pub async fn handle_atualizar_conversation(
    State(state): State<AppState>,
    Path((turma_id, conversation_id)): Path<(i64, i64)>,
    Json(alteracoes): Json<ConversationAtualizacao>,
) -> AppResult<Json<Conversation>> {
    let conversa = conversation_service::atualizar_conversation(
        &state.db_pool,
        turma_id,
        conversation_id,
        alteracoes,
    )
    .await?;
    Ok(Json(conversa))
}

/// DELETE /turmas/{id}/conversations/{conversation_id} (só a associação)
pub async fn handle_desassociar_conversation(
    State(state): State<AppState>,
    Path((turma_id, conversation_id)): Path<(i64, i64)>,
) -> AppResult<Json<Confirmacao>> {
    conversation_service::desassociar(&state.db_pool, turma_id, conversation_id).await?;
    Ok(Json(Confirmacao::ok()))
}

/// GET /turmas/{id}/conversations/data?start_date=&end_date=
pub async fn handle_conversations_por_periodo(
    State(state): State<AppState>,
    Path(turma_id): Path<i64>,
    Query(filtro): Query<FiltroPeriodo>,
) -> AppResult<Json<Vec<Conversation>>> {
    let conversas =
        conversation_service::listar_por_periodo(&state.db_pool, turma_id, &filtro).await?;
    Ok(Json(conversas))
}
