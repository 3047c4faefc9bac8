// src/web/routes.rs
use crate::{
    state::AppState,
    web::{aluno_handlers, conversation_handlers, turma_handlers, tutor_handlers},
};
use axum::{
    routing::{get, post, put},
    Router,
};

pub fn create_router(app_state: AppState) -> Router {
    // --- Tutores ---
    let tutor_routes = Router::new()
        .route(
            "/tutors",
            post(tutor_handlers::handle_criar_tutor).get(tutor_handlers::handle_listar_tutores),
        )
        .route(
            "/tutors/",
            post(tutor_handlers::handle_criar_tutor).get(tutor_handlers::handle_listar_tutores),
        )
        .route(
            "/tutors/{id}",
            get(tutor_handlers::handle_ver_tutor)
                .put(tutor_handlers::handle_atualizar_tutor)
                .delete(tutor_handlers::handle_apagar_tutor),
        )
        .route("/tutors/{id}/turmas", get(tutor_handlers::handle_turmas_do_tutor))
        .route("/tutors/{id}/alunos", get(tutor_handlers::handle_alunos_do_tutor));

    // --- Turmas ---
    // Segmentos fixos (nome, alunos) têm prioridade sobre {id}
    let turma_routes = Router::new()
        .route(
            "/turmas",
            post(turma_handlers::handle_criar_turma).get(turma_handlers::handle_listar_turmas),
        )
        .route(
            "/turmas/",
            post(turma_handlers::handle_criar_turma).get(turma_handlers::handle_listar_turmas),
        )
        .route("/turmas/nome/{nome}", get(turma_handlers::handle_info_por_nome))
        .route(
            "/turmas/{id}",
            get(turma_handlers::handle_ver_turma)
                .put(turma_handlers::handle_atualizar_turma)
                .delete(turma_handlers::handle_apagar_turma),
        )
        .route("/turmas/{id}/tutor/{tutor_id}", put(turma_handlers::handle_atribuir_tutor));

    // --- Alunos (escopados à turma) ---
    let aluno_routes = Router::new()
        .route("/turmas/alunos/busca", get(aluno_handlers::handle_buscar_por_nome))
        .route("/turmas/alunos/{aluno_id}", get(aluno_handlers::handle_ver_aluno_por_id))
        // Aqui {id} é o ID do aluno
        .route("/turmas/{id}/trocar-turma", put(aluno_handlers::handle_trocar_turma))
        .route(
            "/turmas/{id}/alunos",
            post(aluno_handlers::handle_criar_aluno).get(aluno_handlers::handle_listar_alunos),
        )
        .route(
            "/turmas/{id}/alunos/quantidade",
            get(turma_handlers::handle_quantidade_alunos),
        )
        .route(
            "/turmas/{id}/alunos/{aluno_id}",
            get(aluno_handlers::handle_ver_aluno)
                .put(aluno_handlers::handle_atualizar_aluno)
                .delete(aluno_handlers::handle_apagar_aluno),
        );

    // --- Conversas (escopadas à turma) ---
    let conversation_routes = Router::new()
        .route(
            "/turmas/{id}/conversations",
            post(conversation_handlers::handle_criar_conversation)
                .get(conversation_handlers::handle_listar_conversations),
        )
        .route(
            "/turmas/{id}/conversations/data",
            get(conversation_handlers::handle_conversations_por_periodo),
        )
        .route(
            "/turmas/{id}/conversations/{conversation_id}",
            get(conversation_handlers::handle_ver_conversation)
                .put(conversation_handlers::handle_atualizar_conversation)
                .delete(conversation_handlers::handle_desassociar_conversation),
        );

    Router::new()
        .merge(tutor_routes)
        .merge(turma_routes)
        .merge(aluno_routes)
        .merge(conversation_routes)
        .with_state(app_state)
}
