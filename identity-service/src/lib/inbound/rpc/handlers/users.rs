use protocol::DeleteUserRequest;
use protocol::DeleteUserResponse;
use protocol::FindUserByIdRequest;
use protocol::GetUserCountByRoleRequest;
use protocol::UpdateUserPasswordRequest;
use protocol::UpdateUserRequest;
use protocol::UserView;
use rpc::RemoteError;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::NewPassword;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserServicePort;
use crate::user::errors::UserError;

fn parse_id(id: &str) -> Result<UserId, RemoteError> {
    Ok(UserId::from_string(id).map_err(UserError::from)?)
}

pub async fn find_all_users<US: UserServicePort>(
    service: &US,
) -> Result<Vec<UserView>, RemoteError> {
    let users = service.list_users().await?;
    Ok(users.into_iter().map(UserView::from).collect())
}

pub async fn find_user_by_id<US: UserServicePort>(
    service: &US,
    request: FindUserByIdRequest,
) -> Result<UserView, RemoteError> {
    let user_id = parse_id(&request.id)?;

    let user = service.get_user(&user_id).await?;
    Ok(user.into())
}

pub async fn update_user<US: UserServicePort>(
    service: &US,
    request: UpdateUserRequest,
) -> Result<UserView, RemoteError> {
    let user_id = parse_id(&request.id)?;
    let command = UpdateUserCommand {
        username: request
            .username
            .map(Username::new)
            .transpose()
            .map_err(UserError::from)?,
        email: request
            .email
            .map(EmailAddress::new)
            .transpose()
            .map_err(UserError::from)?,
    };

    let user = service.update_user(&user_id, command).await?;
    Ok(user.into())
}

pub async fn update_user_password<US: UserServicePort>(
    service: &US,
    request: UpdateUserPasswordRequest,
) -> Result<UserView, RemoteError> {
    let user_id = parse_id(&request.id)?;
    let password =
        NewPassword::new(request.new_password.expose().to_string()).map_err(UserError::from)?;

    let user = service.update_password(&user_id, password).await?;
    Ok(user.into())
}

pub async fn delete_user<US: UserServicePort>(
    service: &US,
    request: DeleteUserRequest,
) -> Result<DeleteUserResponse, RemoteError> {
    let user_id = parse_id(&request.id)?;

    service.delete_user(&user_id).await?;
    Ok(DeleteUserResponse::deleted())
}

pub async fn get_user_count<US: UserServicePort>(service: &US) -> Result<u64, RemoteError> {
    Ok(service.count_users().await?)
}

pub async fn get_user_count_by_role<US: UserServicePort>(
    service: &US,
    request: GetUserCountByRoleRequest,
) -> Result<u64, RemoteError> {
    Ok(service.count_users_by_role(request.role).await?)
}
