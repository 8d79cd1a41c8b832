use num_bigint::BigUint;
use tonic::transport::{Channel, Endpoint};
use tonic::Status;
use tracing::{debug, info};

use crate::crypto::encoding;
use crate::proto::auth_client::AuthClient;
use crate::proto::{AuthenticationAnswerRequest, AuthenticationChallengeRequest, RegisterRequest};
use crate::{GroupParameters, Prover, SecureRng, Witness};

/// Errors surfaced by [`ProverClient`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error("server rejected request: {} ({})", .0.message(), .0.code())]
    Rpc(#[from] Status),

    #[error(transparent)]
    Protocol(#[from] crate::Error),
}

/// Prover process: holds the secret and talks to a verifier over gRPC.
pub struct ProverClient {
    client: AuthClient<Channel>,
    prover: Prover,
    rng: SecureRng,
}

impl ProverClient {
    /// Connects to the verifier at `endpoint`, e.g. `http://127.0.0.1:50051`.
    pub async fn connect(
        endpoint: impl Into<String>,
        params: GroupParameters,
        witness: Witness,
    ) -> Result<Self, ClientError> {
        let channel = Endpoint::from_shared(endpoint.into())?.connect().await?;
        Ok(Self {
            client: AuthClient::new(channel),
            prover: Prover::new(params, witness),
            rng: SecureRng::new(),
        })
    }

    pub fn prover(&self) -> &Prover {
        &self.prover
    }

    /// Sends `(y1, y2)` for `user`.
    pub async fn register(&mut self, user: &str) -> Result<(), ClientError> {
        let statement = self.prover.statement();
        self.client
            .register(RegisterRequest {
                user: user.to_string(),
                y1: encoding::encode(statement.y1()),
                y2: encoding::encode(statement.y2()),
            })
            .await?;
        info!(user, "registered");
        Ok(())
    }

    /// Runs one challenge/response round and returns the session id.
    pub async fn login(&mut self, user: &str) -> Result<String, ClientError> {
        let (commitment, nonce) = self.prover.commit(&mut self.rng);

        let challenge = self
            .client
            .create_authentication_challenge(AuthenticationChallengeRequest {
                user: user.to_string(),
                r1: encoding::encode(commitment.r1()),
                r2: encoding::encode(commitment.r2()),
            })
            .await?
            .into_inner();
        debug!(user, auth_id = %challenge.auth_id, "challenge received");

        let c: BigUint = encoding::decode("c", &challenge.c)?;
        let s = self.prover.respond(nonce, &c);

        let answer = self
            .client
            .verify_authentication(AuthenticationAnswerRequest {
                auth_id: challenge.auth_id,
                s: encoding::encode(&s),
            })
            .await?
            .into_inner();
        info!(user, "authenticated");
        Ok(answer.session_id)
    }
}
