// 地图 HTTP 服务
//
// MapServer 负责：
// - 绑定监听地址，启动和停止 accept 循环
// - 读取请求体后把请求交给路由，文件读取与解析放在阻塞线程池中执行

use anyhow::{Context, Result};
use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::RwLock;

use super::body::BoxBody;
use super::responses;
use super::router::route;
use crate::models::ServerConfig;
use crate::services::MapService;

/// 地图服务实例
pub struct MapServer {
    config: ServerConfig,
    service: Arc<MapService>,
    server_handle: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
    local_addr: RwLock<Option<SocketAddr>>,
}

impl MapServer {
    pub fn new(config: ServerConfig, service: Arc<MapService>) -> Self {
        Self {
            config,
            service,
            server_handle: Arc::new(RwLock::new(None)),
            local_addr: RwLock::new(None),
        }
    }

    /// 启动服务，返回实际监听地址（端口为 0 时由系统分配）
    pub async fn start(&self) -> Result<SocketAddr> {
        {
            let handle = self.server_handle.read().await;
            if handle.is_some() {
                anyhow::bail!("地图服务已在运行");
            }
        }

        let listener = TcpListener::bind((self.config.host.as_str(), self.config.port))
            .await
            .with_context(|| format!("绑定 {}:{} 失败", self.config.host, self.config.port))?;
        let addr = listener.local_addr().context("读取监听地址失败")?;

        tracing::info!(addr = %addr, "地图服务启动: http://{}", addr);

        let service = Arc::clone(&self.service);

        let handle = tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, peer)) => {
                        let service = Arc::clone(&service);

                        tokio::spawn(async move {
                            let io = TokioIo::new(stream);
                            let handler = service_fn(move |req| {
                                let service = Arc::clone(&service);
                                async move { handle_request(req, service).await }
                            });

                            if let Err(err) =
                                http1::Builder::new().serve_connection(io, handler).await
                            {
                                tracing::warn!(peer = %peer, error = ?err, "处理连接失败");
                            }
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = ?e, "接受连接失败");
                    }
                }
            }
        });

        {
            let mut h = self.server_handle.write().await;
            *h = Some(handle);
        }
        {
            let mut a = self.local_addr.write().await;
            *a = Some(addr);
        }

        Ok(addr)
    }

    /// 停止服务
    pub async fn stop(&self) -> Result<()> {
        let handle = {
            let mut h = self.server_handle.write().await;
            h.take()
        };

        if let Some(handle) = handle {
            handle.abort();
            tracing::info!("地图服务已停止");
        }
        self.local_addr.write().await.take();

        Ok(())
    }

    pub async fn is_running(&self) -> bool {
        self.server_handle.read().await.is_some()
    }

    pub async fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.read().await
    }
}

/// 处理单个请求
async fn handle_request(
    req: Request<Incoming>,
    service: Arc<MapService>,
) -> Result<Response<BoxBody>, Infallible> {
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(|s| s.to_string());

    let body = if method != Method::GET && method != Method::HEAD {
        match req.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                tracing::warn!(error = ?e, "读取请求体失败");
                return Ok(responses::internal_error(&format!("读取请求体失败: {e}")));
            }
        }
    } else {
        Bytes::new()
    };

    let response = {
        let method = method.clone();
        let path = path.clone();
        tokio::task::spawn_blocking(move || {
            route(&service, &method, &path, query.as_deref(), body)
        })
        .await
    };

    let response = match response {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = ?e, "请求处理任务异常退出");
            responses::internal_error("请求处理任务异常退出")
        }
    };

    tracing::info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "请求完成"
    );

    Ok(response)
}
