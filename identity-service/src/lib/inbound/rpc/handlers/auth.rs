use protocol::AuthResult;
use protocol::LoginRequest;
use protocol::RegisterRequest;
use protocol::ValidateUserRequest;
use rpc::RemoteError;

use crate::domain::auth::models::Credentials;
use crate::domain::auth::models::RegisterCommand;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::NewPassword;
use crate::domain::user::models::Username;
use crate::user::errors::UserError;

pub async fn register<AS: AuthServicePort>(
    service: &AS,
    request: RegisterRequest,
) -> Result<AuthResult, RemoteError> {
    let command = RegisterCommand::new(
        Username::new(request.username).map_err(UserError::from)?,
        EmailAddress::new(request.email).map_err(UserError::from)?,
        NewPassword::new(request.password.expose().to_string()).map_err(UserError::from)?,
    );

    let authenticated = service.register(command).await?;
    Ok(authenticated.into())
}

pub async fn validate_user<AS: AuthServicePort>(
    service: &AS,
    request: ValidateUserRequest,
) -> Result<AuthResult, RemoteError> {
    let credentials = Credentials::new(request.email, request.password.expose());

    let authenticated = service.validate_user(credentials).await?;
    Ok(authenticated.into())
}

pub async fn login<AS: AuthServicePort>(
    service: &AS,
    request: LoginRequest,
) -> Result<AuthResult, RemoteError> {
    let credentials = Credentials::new(request.email, request.password.expose());

    let authenticated = service.login(credentials).await?;
    Ok(authenticated.into())
}
