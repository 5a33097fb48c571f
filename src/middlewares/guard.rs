use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderValue, CACHE_CONTROL, EXPIRES, LOCATION, PRAGMA},
    Error, HttpResponse,
};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use crate::context::{verify_session, SESSION_COOKIE};
use crate::impls::tokener::jwt::JWT;

pub static LOGIN_PATH: &str = "/hot_admin";
pub static DASHBOARD_PATH: &str = "/hot_admin/dashboard";

const LOGIN_PATHS: [&str; 3] = ["/hot_admin", "/admin", "/admin/login"];
const DASHBOARD_PREFIXES: [&str; 3] = ["/hot_admin/dashboard", "/dashboard", "/admin/dashboard"];
const PASSTHROUGH_PREFIXES: [&str; 3] = ["/api", "/_next", "/static"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Login,
    Dashboard,
    Other,
}

fn classify(path: &str) -> Page {
    let under = |prefix: &str| path == prefix || path.starts_with(&format!("{}/", prefix));
    if PASSTHROUGH_PREFIXES.iter().any(|p| under(p)) || path.contains("favicon.ico") {
        return Page::Other;
    }
    let trimmed = if path.len() > 1 { path.trim_end_matches('/') } else { path };
    if LOGIN_PATHS.contains(&trimmed) {
        return Page::Login;
    }
    if DASHBOARD_PREFIXES.iter().any(|p| under(p)) {
        return Page::Dashboard;
    }
    Page::Other
}

/// Keeps anonymous visitors out of the dashboard pages and signed-in admins off the login page.
/// Only the session cookie is consulted here; API routes do their own checks.
pub(crate) struct EdgeGuard {
    tokener: JWT,
}

impl EdgeGuard {
    pub fn new(tokener: JWT) -> Self {
        Self { tokener }
    }
}

impl<S, B> Transform<S, ServiceRequest> for EdgeGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = EdgeGuardService<S>;
    type InitError = ();
    type Future = Pin<Box<dyn Future<Output = Result<Self::Transform, Self::InitError>>>>;
    fn new_transform(&self, service: S) -> Self::Future {
        let tokener = self.tokener.clone();
        Box::pin(async move {
            Ok(EdgeGuardService {
                tokener,
                next_service: Rc::new(service),
            })
        })
    }
}

pub struct EdgeGuardService<S> {
    tokener: JWT,
    next_service: Rc<S>,
}

impl<S> EdgeGuardService<S> {
    fn is_signed_in(&self, req: &ServiceRequest) -> bool {
        req.request()
            .cookie(SESSION_COOKIE)
            .map(|c| verify_session(&self.tokener, c.value()).is_some())
            .unwrap_or(false)
    }
}

fn redirect<B>(req: ServiceRequest, to: &'static str) -> ServiceResponse<EitherBody<B>> {
    let resp = HttpResponse::Found().insert_header((LOCATION, to)).finish();
    req.into_response(resp).map_into_right_body()
}

impl<S, B> Service<ServiceRequest> for EdgeGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;
    fn poll_ready(&self, ctx: &mut std::task::Context<'_>) -> std::task::Poll<Result<(), Self::Error>> {
        self.next_service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let page = classify(req.path());
        if page == Page::Other {
            let res_fut = self.next_service.call(req);
            return Box::pin(async move { Ok(res_fut.await?.map_into_left_body()) });
        }
        match (page, self.is_signed_in(&req)) {
            (Page::Dashboard, false) => Box::pin(async move { Ok(redirect(req, LOGIN_PATH)) }),
            (Page::Login, true) => Box::pin(async move { Ok(redirect(req, DASHBOARD_PATH)) }),
            (Page::Dashboard, true) => {
                let res_fut = self.next_service.call(req);
                Box::pin(async move {
                    let mut resp = res_fut.await?;
                    let headers = resp.headers_mut();
                    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store, no-cache, must-revalidate, proxy-revalidate"));
                    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
                    headers.insert(EXPIRES, HeaderValue::from_static("0"));
                    Ok(resp.map_into_left_body())
                })
            }
            _ => {
                let res_fut = self.next_service.call(req);
                Box::pin(async move { Ok(res_fut.await?.map_into_left_body()) })
            }
        }
    }
}
