//! Stdio MCP transport helper, decoupled from tool logic.
//!
//! The JSON-RPC framing, handshake and capability negotiation are owned by
//! rmcp; this module only wires a handler + tool router onto stdin/stdout.
//! The server handles requests sequentially and exits cleanly when the
//! input channel closes.

use rmcp::handler::server::router::Router;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::serve_server;

pub use rmcp::ServerHandler;

pub async fn serve_stdio<H>(
    factory: impl FnOnce() -> (H, ToolRouter<H>),
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    H: ServerHandler,
{
    let (handler, tools) = factory();
    let service = Router::new(handler).with_tools(tools);
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();
    serve_server(service, (stdin, stdout)).await?;
    Ok(())
}
