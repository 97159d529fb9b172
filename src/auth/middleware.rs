use std::rc::Rc;
use std::sync::Arc;

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use log::debug;

use super::guard::{Decision, Guard};
use crate::error::AppError;

/// Runs the request guard in front of one endpoint.
///
/// The `exempt` flag comes from the endpoint's route table entry and is handed
/// to the guard, which lets exempt requests through without any token work.
/// Rejections are rendered as `AppError` responses rather than returned as
/// service errors.
pub struct RequireAuth {
    guard: Arc<Guard>,
    exempt: bool,
}

impl RequireAuth {
    pub fn new(guard: Arc<Guard>, exempt: bool) -> Self {
        Self { guard, exempt }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RequireAuthService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireAuthService {
            service: Rc::new(service),
            guard: Arc::clone(&self.guard),
            exempt: self.exempt,
        }))
    }
}

pub struct RequireAuthService<S> {
    service: Rc<S>,
    guard: Arc<Guard>,
    exempt: bool,
}

impl<S, B> Service<ServiceRequest> for RequireAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let guard = Arc::clone(&self.guard);
        let exempt = self.exempt;
        let authorization = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        Box::pin(async move {
            match guard.check(exempt, authorization.as_deref()).await {
                Decision::Allowed(user) => {
                    if let Some(user) = user {
                        req.extensions_mut().insert(user);
                    }
                    service
                        .call(req)
                        .await
                        .map(ServiceResponse::map_into_left_body)
                }
                Decision::Rejected(err) => {
                    debug!("{} {} rejected", req.method(), req.path());
                    Ok(req
                        .error_response(AppError::from(err))
                        .map_into_right_body())
                }
            }
        })
    }
}
