use std::time::Instant;

use metrics::{counter, histogram};
use tonic::{Request, Response, Status};
use tracing::debug;

use super::VerifierEngine;
use crate::crypto::encoding;
use crate::proto::auth_server::Auth;
use crate::proto::{
    AuthenticationAnswerRequest, AuthenticationAnswerResponse, AuthenticationChallengeRequest,
    AuthenticationChallengeResponse, RegisterRequest, RegisterResponse,
};
use crate::Error;

const MAX_USER_ID_LEN: usize = 256;

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        match err {
            Error::AlreadyRegistered(_) => Status::already_exists(err.to_string()),
            Error::UnknownUser(_) | Error::UnknownAuthId(_) => Status::not_found(err.to_string()),
            Error::ProofMismatch => Status::unauthenticated("authentication failed"),
            Error::TooManyChallenges { .. } => Status::resource_exhausted(err.to_string()),
            Error::InvalidEncoding { .. } | Error::InvalidGroupElement(_) => {
                Status::invalid_argument(err.to_string())
            }
            Error::Configuration(_) => Status::internal(err.to_string()),
        }
    }
}

/// gRPC front end of the [`VerifierEngine`].
///
/// Decodes the decimal fields, checks user ids, records metrics and maps
/// engine errors onto status codes.
#[derive(Clone)]
pub struct AuthServiceImpl {
    engine: VerifierEngine,
}

impl AuthServiceImpl {
    pub fn new(engine: VerifierEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &VerifierEngine {
        &self.engine
    }

    #[allow(clippy::result_large_err)]
    fn validate_user_id(user_id: &str) -> Result<(), Status> {
        if user_id.is_empty() {
            return Err(Status::invalid_argument("User ID cannot be empty"));
        }

        if user_id.chars().count() > MAX_USER_ID_LEN {
            return Err(Status::invalid_argument("User ID too long"));
        }

        if !user_id
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '@'))
        {
            return Err(Status::invalid_argument(
                "User ID contains invalid characters",
            ));
        }

        Ok(())
    }

    fn record(operation: &'static str, start: Instant, ok: bool) {
        histogram!(format!("auth.{operation}.duration")).record(start.elapsed().as_secs_f64());
        if ok {
            counter!(format!("auth.{operation}.success")).increment(1);
        } else {
            counter!(format!("auth.{operation}.failure")).increment(1);
        }
    }
}

#[tonic::async_trait]
impl Auth for AuthServiceImpl {
    async fn register(
        &self,
        request: Request<RegisterRequest>,
    ) -> Result<Response<RegisterResponse>, Status> {
        let start = Instant::now();
        counter!("auth.register.requests").increment(1);

        let req = request.into_inner();
        debug!(user_id = %req.user, "register request");

        let result = async {
            Self::validate_user_id(&req.user)?;
            let y1 = encoding::decode("y1", &req.y1)?;
            let y2 = encoding::decode("y2", &req.y2)?;
            self.engine.register(&req.user, y1, y2).await?;
            Ok::<_, Status>(())
        }
        .await;

        Self::record("register", start, result.is_ok());
        result?;

        Ok(Response::new(RegisterResponse {}))
    }

    async fn create_authentication_challenge(
        &self,
        request: Request<AuthenticationChallengeRequest>,
    ) -> Result<Response<AuthenticationChallengeResponse>, Status> {
        let start = Instant::now();
        counter!("auth.challenge.requests").increment(1);

        let req = request.into_inner();
        debug!(user_id = %req.user, "challenge request");

        let result = async {
            Self::validate_user_id(&req.user)?;
            let r1 = encoding::decode("r1", &req.r1)?;
            let r2 = encoding::decode("r2", &req.r2)?;
            let issued = self
                .engine
                .create_authentication_challenge(&req.user, r1, r2)
                .await?;
            Ok::<_, Status>(issued)
        }
        .await;

        Self::record("challenge", start, result.is_ok());
        let (auth_id, c) = result?;

        Ok(Response::new(AuthenticationChallengeResponse {
            auth_id,
            c: encoding::encode(&c),
        }))
    }

    async fn verify_authentication(
        &self,
        request: Request<AuthenticationAnswerRequest>,
    ) -> Result<Response<AuthenticationAnswerResponse>, Status> {
        let start = Instant::now();
        counter!("auth.verify.requests").increment(1);

        let req = request.into_inner();
        debug!(auth_id = %req.auth_id, "verification request");

        let result = async {
            let s = encoding::decode("s", &req.s)?;
            let session_id = self.engine.verify_authentication(&req.auth_id, &s).await?;
            Ok::<_, Status>(session_id)
        }
        .await;

        Self::record("verify", start, result.is_ok());
        let session_id = result?;

        Ok(Response::new(AuthenticationAnswerResponse { session_id }))
    }
}
