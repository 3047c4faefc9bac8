// src/web/tutor_handlers.rs
use crate::{
    error::AppResult,
    models::{
        aluno::Aluno,
        paginacao::Paginacao,
        turma::Turma,
        tutor::{NovoTutor, Tutor, TutorAtualizacao},
    },
    services::tutor_service,
    state::AppState,
    web::Confirmacao,
};
use axum::extract::{Json, Path, Query, State};
use sqlx::SqlitePool;

/// POST /tutors/
pub async fn handle_criar_tutor(
    State(db_pool): State<SqlitePool>,
    Json(novo): Json<NovoTutor>,
) -> AppResult<Json<Tutor>> {
    let tutor = tutor_service::criar_tutor(&db_pool, novo).await?;
    Ok(Json(tutor))
}

/// GET /tutors/?offset=&limit=
pub async fn handle_listar_tutores(
    State(db_pool): State<SqlitePool>,
    Query(pagina): Query<Paginacao>,
) -> AppResult<Json<Vec<Tutor>>> {
    let tutores = tutor_service::listar_tutores(&db_pool, pagina).await?;
    Ok(Json(tutores))
}

pub async fn handle_ver_tutor(
    State(db_pool): State<SqlitePool>,
    Path(tutor_id): Path<i64>,
) -> AppResult<Json<Tutor>> {
    let tutor = tutor_service::buscar_tutor(&db_pool, tutor_id).await?;
    Ok(Json(tutor))
}

pub async fn handle_atualizar_tutor(
    State(db_pool): State<SqlitePool>,
    Path(tutor_id): Path<i64>,
    Json(alteracoes): Json<TutorAtualizacao>,
) -> AppResult<Json<Tutor>> {
    let tutor = tutor_service::atualizar_tutor(&db_pool, tutor_id, alteracoes).await?;
    Ok(Json(tutor))
}

pub async fn handle_apagar_tutor(
    State(db_pool): State<SqlitePool>,
    Path(tutor_id): Path<i64>,
) -> AppResult<Json<Confirmacao>> {
    tutor_service::apagar_tutor(&db_pool, tutor_id).await?;
    Ok(Json(Confirmacao::ok()))
}

/// GET /tutors/{id}/turmas
pub async fn handle_turmas_do_tutor(
    State(state): State<AppState>,
    Path(tutor_id): Path<i64>,
) -> AppResult<Json<Vec<Turma>>> {
    let turmas =
        tutor_service::turmas_do_tutor(&state.db_pool, tutor_id, state.config.lista_vazia_404)
            .await?;
    Ok(Json(turmas))
}

/// GET /tutors/{id}/alunos
pub async fn handle_alunos_do_tutor(
    State(state): State<AppState>,
    Path(tutor_id): Path<i64>,
) -> AppResult<Json<Vec<Aluno>>> {
    let alunos =
        tutor_service::alunos_do_tutor(&state.db_pool, tutor_id, state.config.lista_vazia_404)
            .await?;
    Ok(Json(alunos))
}
