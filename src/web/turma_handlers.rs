// src/web/turma_handlers.rs
use crate::{
    error::AppResult,
    models::{
        paginacao::Paginacao,
        turma::{InfoTurma, NovaTurma, QuantidadeAlunos, Turma, TurmaAtualizacao, TurmaDetalhada},
    },
    services::turma_service,
    state::AppState,
    web::Confirmacao,
};
use axum::extract::{Json, Path, Query, State};

pub async fn handle_criar_turma(
    State(state): State<AppState>,
    Json(nova): Json<NovaTurma>,
) -> AppResult<Json<Turma>> {
    let turma = turma_service::criar_turma(&state.db_pool, nova).await?;
    Ok(Json(turma))
}

/// GET /turmas/?offset=&limit= (com tutor, alunos e conversas)
pub async fn handle_listar_turmas(
    State(state): State<AppState>,
    Query(pagina): Query<Paginacao>,
) -> AppResult<Json<Vec<TurmaDetalhada>>> {
    let turmas = turma_service::listar_turmas(&state.db_pool, pagina).await?;
    Ok(Json(turmas))
}

pub async fn handle_ver_turma(
    State(state): State<AppState>,
    Path(turma_id): Path<i64>,
) -> AppResult<Json<TurmaDetalhada>> {
    let turma = turma_service::buscar_turma(&state.db_pool, turma_id).await?;
    Ok(Json(turma))
}

pub async fn handle_atualizar_turma(
    State(state): State<AppState>,
    Path(turma_id): Path<i64>,
    Json(alteracoes): Json<TurmaAtualizacao>,
) -> AppResult<Json<Turma>> {
    let turma = turma_service::atualizar_turma(&state.db_pool, turma_id, alteracoes).await?;
    Ok(Json(turma))
}

pub async fn handle_apagar_turma(
    State(state): State<AppState>,
    Path(turma_id): Path<i64>,
) -> AppResult<Json<Confirmacao>> {
    turma_service::apagar_turma(&state.db_pool, turma_id).await?;
    Ok(Json(Confirmacao::ok()))
}

/// PUT /turmas/{id}/tutor/{tutor_id}
pub async fn handle_atribuir_tutor(
    State(state): State<AppState>,
    Path((turma_id, tutor_id)): Path<(i64, i64)>,
) -> AppResult<Json<Turma>> {
    let turma = turma_service::atribuir_tutor(&state.db_pool, turma_id, tutor_id).await?;
    Ok(Json(turma))
}

/// GET /turmas/nome/{nome}
pub async fn handle_info_por_nome(
    State(state): State<AppState>,
    Path(nome): Path<String>,
) -> AppResult<Json<InfoTurma>> {
    let info = turma_service::info_por_nome(&state.db_pool, &nome).await?;
    Ok(Json(info))
}

/// GET /turmas/{id}/alunos/quantidade
pub async fn handle_quantidade_alunos(
    State(state): State<AppState>,
    Path(turma_id): Path<i64>,
) -> AppResult<Json<QuantidadeAlunos>> {
    let quantidade = turma_service::quantidade_alunos(&state.db_pool, turma_id).await?;
    Ok(Json(quantidade))
}
