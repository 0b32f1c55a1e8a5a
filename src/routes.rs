use std::{convert::Infallible, result, sync::Arc};

use log::error;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use warp::{http::StatusCode, Filter, Rejection, Reply};

use crate::auth::{self, Credentials, Operation};
use crate::directory::{Directory, DirectoryAuthed};
use crate::error::{Error, Field};
use crate::user::{UserFields, UserView};

#[derive(Debug, Deserialize)]
struct ListQuery {
    page: Option<i32>,
    limit: Option<i32>,
}

#[derive(Serialize)]
struct Created {
    id: String,
}

#[derive(Serialize)]
struct Users {
    users: Vec<UserView>,
}

#[derive(Serialize)]
struct OneUser {
    user: UserView,
}

#[derive(Serialize)]
struct Empty {}

#[derive(Serialize)]
struct ErrorMessage {
    error: String,
}

pub fn routes(
    dir: Arc<Directory>,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone + Send + Sync + 'static {
    let with_dir = warp::any().map(move || Arc::clone(&dir));

    let new_user = warp::path!("api" / "v1" / "users")
        .and(warp::post())
        .and(gate(Operation::NewUser))
        .and(warp::body::json())
        .and(with_dir.clone())
        .and_then(new_user);

    let list = warp::path!("api" / "v1" / "users")
        .and(warp::get())
        .and(public(Operation::GetUsers))
        .and(warp::query::<ListQuery>())
        .and(with_dir.clone())
        .and_then(list_users);

    let by_username = warp::path!("api" / "v1" / "users" / "by-username" / String)
        .and(warp::get())
        .and(public(Operation::GetUserByUsername))
        .and(with_dir.clone())
        .and_then(user_by_username);

    let by_id = warp::path!("api" / "v1" / "users" / String)
        .and(warp::get())
        .and(public(Operation::GetUserById))
        .and(with_dir.clone())
        .and_then(user_by_id);

    let update = warp::path!("api" / "v1" / "users" / String)
        .and(warp::put())
        .and(gate(Operation::UpdateUser))
        .and(warp::body::json())
        .and(with_dir.clone())
        .and_then(update_user);

    let delete = warp::path!("api" / "v1" / "users" / String)
        .and(warp::delete())
        .and(gate(Operation::DeleteUser))
        .and(with_dir)
        .and_then(delete_user);

    new_user
        .or(list)
        .or(by_username)
        .or(by_id)
        .or(update)
        .or(delete)
        .recover(handle_rejection)
        .with(warp::log("userdir"))
}

fn gate(op: Operation) -> impl Filter<Extract = (Option<Credentials>,), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization").and_then(move |header: Option<String>| async move {
        auth::authorize(op, header.as_deref()).map_err(warp::reject::custom)
    })
}

// reads never look at the authorization header
fn public(op: Operation) -> impl Filter<Extract = (), Error = Rejection> + Clone {
    warp::any()
        .and_then(move || async move {
            auth::authorize(op, None)
                .map(|_| ())
                .map_err(warp::reject::custom)
        })
        .untuple_one()
}

fn admin(dir: &Arc<Directory>, creds: Option<Credentials>) -> crate::error::Result<DirectoryAuthed<true>> {
    let creds = creds.ok_or(Error::PermissionDenied)?;

    dir.login(&creds)?.admin()
}

/// Run `f` off the async workers; password hashing is slow on purpose.
async fn blocking<T, F>(f: F) -> result::Result<T, Rejection>
where
    T: Send + 'static,
    F: FnOnce() -> crate::error::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            error!("worker failed: {e:?}");
            warp::reject::custom(Error::Internal)
        })?
        .map_err(warp::reject::custom)
}

async fn new_user(
    creds: Option<Credentials>,
    fields: UserFields,
    dir: Arc<Directory>,
) -> result::Result<impl Reply, Rejection> {
    let id = blocking(move || admin(&dir, creds)?.new_user(fields)).await?;

    Ok(warp::reply::with_status(
        warp::reply::json(&Created { id }),
        StatusCode::CREATED,
    ))
}

async fn list_users(query: ListQuery, dir: Arc<Directory>) -> result::Result<impl Reply, Rejection> {
    let users = dir
        .users(query.page.unwrap_or(-1), query.limit.unwrap_or(-1))
        .map_err(warp::reject::custom)?;

    Ok(warp::reply::json(&Users {
        users: users.into_iter().map(UserView::from).collect(),
    }))
}

async fn user_by_username(username: String, dir: Arc<Directory>) -> result::Result<impl Reply, Rejection> {
    let username = percent_decode_str(&username).decode_utf8().map_err(|e| {
        error!("username in path isn't utf-8: {e}");
        warp::reject::custom(Error::ValidationFailed(Field::Username))
    })?;

    let user = dir
        .user_by_username(&username)
        .map_err(warp::reject::custom)?;

    Ok(warp::reply::json(&OneUser { user: user.into() }))
}

async fn user_by_id(id: String, dir: Arc<Directory>) -> result::Result<impl Reply, Rejection> {
    let user = dir.user_by_id(&id).map_err(warp::reject::custom)?;

    Ok(warp::reply::json(&OneUser { user: user.into() }))
}

async fn update_user(
    id: String,
    creds: Option<Credentials>,
    fields: UserFields,
    dir: Arc<Directory>,
) -> result::Result<impl Reply, Rejection> {
    let user = blocking(move || admin(&dir, creds)?.update_user(&id, fields)).await?;

    Ok(warp::reply::json(&OneUser { user: user.into() }))
}

async fn delete_user(
    id: String,
    creds: Option<Credentials>,
    dir: Arc<Directory>,
) -> result::Result<impl Reply, Rejection> {
    blocking(move || admin(&dir, creds)?.delete_user(&id)).await?;

    Ok(warp::reply::json(&Empty {}))
}

async fn handle_rejection(err: Rejection) -> result::Result<impl Reply, Infallible> {
    let (status, message) = if let Some(&e) = err.find::<Error>() {
        (StatusCode::from(e), e.to_string())
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, "not found".into())
    } else if err.find::<warp::filters::body::BodyDeserializeError>().is_some()
        || err.find::<warp::reject::InvalidQuery>().is_some()
        || err.find::<warp::reject::InvalidHeader>().is_some()
    {
        (StatusCode::BAD_REQUEST, "malformed request".into())
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        (StatusCode::UNSUPPORTED_MEDIA_TYPE, "expected json".into())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "method not allowed".into())
    } else {
        error!("unhandled rejection: {err:?}");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error".into())
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&ErrorMessage { error: message }),
        status,
    ))
}
