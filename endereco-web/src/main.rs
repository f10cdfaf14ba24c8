//! Servidor web Axum com WebSocket para inspeção da geração e separação de endereços

mod config;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use endereco_core::{
    corpus::{demo_records, demo_texts},
    dataset::record_rng,
    AddressParams, AddressPipeline, AddressRecord, CrfsTagger, Error, PipelineEvent, Token,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

use crate::config::ServerConfig;

/// Estado compartilhado da aplicação
struct AppState {
    pipeline: AddressPipeline,
    seed: u64,
}

#[derive(Deserialize)]
struct RenderRequest {
    record: AddressRecord,
    #[serde(default)]
    seed: Option<u64>,
    /// Parâmetros fixos; quando ausentes, são sorteados a partir da semente.
    #[serde(default)]
    params: Option<AddressParams>,
}

#[derive(Deserialize)]
struct TextRequest {
    text: String,
}

/// Mensagem WebSocket recebida do cliente
#[derive(Deserialize)]
#[serde(untagged)]
enum WsRequest {
    Render {
        record: AddressRecord,
        #[serde(default)]
        seed: Option<u64>,
    },
    Separate {
        text: String,
    },
}

#[derive(Serialize)]
struct TokenFeatures {
    token: Token,
    features: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env()?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = ServerConfig::from_env()?;

    let mut pipeline = AddressPipeline::default();
    match &config.model {
        Some(path) => {
            let tagger = CrfsTagger::from_path(path)?;
            info!(path = %path.display(), labels = tagger.labels().len(), "modelo carregado");
            pipeline = pipeline.with_tagger(Arc::new(tagger));
        }
        None => warn!("ENDERECO_MODEL não definido: /separate ficará indisponível"),
    }
    let state = Arc::new(AppState {
        pipeline,
        seed: config.seed,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(index_handler))
        .route("/demo-records", get(demo_records_handler))
        .route("/render", post(render_handler))
        .route("/features", post(features_handler))
        .route("/separate", post(separate_handler))
        .route("/ws", get(ws_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!(addr = %config.addr, seed = config.seed, "servidor de endereços iniciado");
    axum::serve(listener, app).await?;
    Ok(())
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({"error": message.into()}))).into_response()
}

/// Retorna a página principal HTML
async fn index_handler() -> impl IntoResponse {
    Html(include_str!("templates/index.html"))
}

/// Registros e textos de demonstração
async fn demo_records_handler() -> impl IntoResponse {
    let texts: Vec<serde_json::Value> = demo_texts()
        .iter()
        .map(|(label, text)| {
            serde_json::json!({
                "label": label,
                "text": text
            })
        })
        .collect();
    Json(serde_json::json!({
        "records": demo_records(),
        "texts": texts,
    }))
}

/// Gera uma variação do registro com tokens, tags e features
async fn render_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RenderRequest>,
) -> impl IntoResponse {
    let output = match req.params {
        Some(params) => state.pipeline.render(&req.record, &params),
        None => {
            let mut rng = record_rng(req.seed.unwrap_or(state.seed), 0);
            state.pipeline.render_sampled(&req.record, &mut rng)
        }
    };
    Json(output).into_response()
}

/// Tokeniza um texto livre e devolve as features de cada token
async fn features_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TextRequest>,
) -> impl IntoResponse {
    if req.text.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Texto vazio");
    }
    let tokens = endereco_core::tokenize(&req.text);
    let features = state.pipeline.extractor().token_features(&tokens);
    let body: Vec<TokenFeatures> = tokens
        .into_iter()
        .zip(&features)
        .map(|(token, fv)| TokenFeatures {
            token,
            features: fv.names().into_iter().map(str::to_string).collect(),
        })
        .collect();
    Json(body).into_response()
}

/// Separa um texto livre em campos com o modelo carregado
async fn separate_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TextRequest>,
) -> impl IntoResponse {
    if !state.pipeline.has_tagger() {
        return error_response(StatusCode::SERVICE_UNAVAILABLE, "Nenhum modelo carregado");
    }
    if req.text.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Texto vazio");
    }

    let pipeline_state = Arc::clone(&state);
    let result =
        tokio::task::spawn_blocking(move || pipeline_state.pipeline.separate(&req.text)).await;
    match result {
        Ok(Ok(output)) => Json(output).into_response(),
        Ok(Err(Error::Model(message))) => error_response(StatusCode::SERVICE_UNAVAILABLE, message),
        Ok(Err(err)) => error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        Err(err) => error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

/// Upgrade HTTP → WebSocket
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Lógica do WebSocket: recebe um registro (ou texto), executa o pipeline e envia os eventos
async fn handle_websocket(mut socket: WebSocket, state: Arc<AppState>) {
    info!("WebSocket conectado");

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => {
                let request = match serde_json::from_str::<WsRequest>(&text) {
                    Ok(request) => request,
                    Err(err) => {
                        let event = PipelineEvent::Error {
                            message: format!("mensagem inválida: {err}"),
                        };
                        if send_event(&mut socket, &event).await.is_err() {
                            return;
                        }
                        continue;
                    }
                };

                // O pipeline é síncrono: roda fora do runtime e os eventos são coletados depois
                let (tx, rx) = std::sync::mpsc::channel::<PipelineEvent>();
                let pipeline_state = Arc::clone(&state);
                let handle = tokio::task::spawn_blocking(move || match request {
                    WsRequest::Render { record, seed } => {
                        let seed = seed.unwrap_or(pipeline_state.seed);
                        info!(seed, "renderizando via WebSocket");
                        let params = pipeline_state
                            .pipeline
                            .sample_params(&mut record_rng(seed, 0));
                        pipeline_state.pipeline.render_streaming(&record, &params, tx);
                    }
                    WsRequest::Separate { text } => {
                        info!(chars = text.len(), "separando via WebSocket");
                        pipeline_state.pipeline.separate_streaming(&text, tx);
                    }
                });
                handle.await.ok();

                let events: Vec<PipelineEvent> = rx.try_iter().collect();
                for event in &events {
                    if send_event(&mut socket, event).await.is_err() {
                        return; // cliente desconectou
                    }
                    // Pequena pausa para animação visual (passo a passo)
                    tokio::time::sleep(tokio::time::Duration::from_millis(35)).await;
                }
            }
            Message::Close(_) => {
                info!("WebSocket desconectado");
                return;
            }
            Message::Ping(payload) => {
                let _ = socket.send(Message::Pong(payload)).await;
            }
            _ => {}
        }
    }
}

async fn send_event(socket: &mut WebSocket, event: &PipelineEvent) -> Result<(), axum::Error> {
    match serde_json::to_string(event) {
        Ok(json) => socket.send(Message::Text(json)).await,
        Err(err) => {
            warn!(%err, "evento não serializável");
            Ok(())
        }
    }
}
