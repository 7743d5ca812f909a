use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use crate::actor_framework::{Filter, ResourceClient};
use crate::domain::{next_timestamp_id, ProfileUpdate, SignUpForm, User};
use crate::error::AuthError;
use crate::session::SessionContext;

/// Account flows: signup, login, logout and profile edits.
#[derive(Clone)]
pub struct UserClient {
    inner: ResourceClient<User>,
    session: SessionContext,
}

impl UserClient {
    pub fn new(inner: ResourceClient<User>, session: SessionContext) -> Self {
        Self { inner, session }
    }

    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn sign_up(&self, form: SignUpForm) -> Result<User, AuthError> {
        form.validate()?;

        // fails fast with a network error when the store is down
        debug!("Probing mock data store");
        self.inner.list(None).await?;

        let email = form.email.trim().to_string();
        let existing = self.inner.list(Some(Filter::eq("email", &email))).await?;
        if !existing.is_empty() {
            warn!("Email already registered");
            return Err(AuthError::EmailTaken(email));
        }

        let mut user = User::from_sign_up(next_timestamp_id(), &form, Utc::now());
        user.id = self.inner.create(user.clone()).await?;
        self.session.sign_in(&user)?;

        info!(user_id = %user.id, "Account created");
        Ok(user)
    }

    /// Demo login: the account must exist, any non-empty password passes.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        debug!("Sending request");
        let email = email.trim();
        let user = self
            .inner
            .list(Some(Filter::eq("email", email)))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AuthError::NoAccount(email.to_string()))?;

        if password.is_empty() {
            return Err(AuthError::MissingPassword);
        }

        self.session.sign_in(&user)?;
        info!(user_id = %user.id, "Login successful");
        Ok(user)
    }

    pub fn logout(&self) -> Result<(), AuthError> {
        self.session.sign_out()?;
        Ok(())
    }

    /// Fresh copy of the signed-in user's record.
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<User, AuthError> {
        let id = self.session.user_id().ok_or(AuthError::NotSignedIn)?;
        debug!(user_id = %id, "Sending request");
        self.inner
            .get(id.clone())
            .await?
            .ok_or(AuthError::ProfileNotFound(id))
    }

    /// Overwrites the stored profile and mirrors it into the session.
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<User, AuthError> {
        let mut user = match self.session.current_user() {
            Some(user) => user,
            None => self.profile().await?,
        };
        user.apply(update);

        let stored = self.inner.replace(user.id.clone(), user).await?;
        self.session.update_user(&stored)?;
        info!(user_id = %stored.id, "Profile updated");
        Ok(stored)
    }
}

impl_record_lookups!(UserClient, User, AuthError, user);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RecordId;
    use crate::error::StoreError;
    use crate::mock_framework::{create_mock_client, expect_create, expect_get, expect_list};

    fn form() -> SignUpForm {
        SignUpForm {
            full_name: "Ada Lovelace King".into(),
            email: "ada@example.com".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn sign_up_creates_user_and_signs_in() {
        let (inner, mut rx) = create_mock_client::<User>(10);
        let session = SessionContext::in_memory();
        let client = UserClient::new(inner, session.clone());

        let task = tokio::spawn(async move { client.sign_up(form()).await });

        let (filter, responder) = expect_list(&mut rx).await.expect("Expected probe");
        assert!(filter.is_none());
        responder.send(Ok(vec![])).unwrap();

        let (filter, responder) = expect_list(&mut rx).await.expect("Expected email lookup");
        assert_eq!(filter, Some(Filter::eq("email", "ada@example.com")));
        responder.send(Ok(vec![])).unwrap();

        let (record, responder) = expect_create(&mut rx).await.expect("Expected Create");
        assert_eq!(record.first_name, "Ada");
        assert_eq!(record.last_name, "Lovelace King");
        responder.send(Ok(record.id.clone())).unwrap();

        let user = task.await.unwrap().unwrap();
        assert!(session.is_logged_in());
        assert_eq!(session.user_id(), Some(user.id));
    }

    #[tokio::test]
    async fn sign_up_rejects_taken_email() {
        let (inner, mut rx) = create_mock_client::<User>(10);
        let client = UserClient::new(inner, SessionContext::in_memory());

        let task = tokio::spawn(async move { client.sign_up(form()).await });

        let (_, responder) = expect_list(&mut rx).await.unwrap();
        responder.send(Ok(vec![])).unwrap();
        let (_, responder) = expect_list(&mut rx).await.unwrap();
        responder.send(Ok(vec![User::default()])).unwrap();

        let err = task.await.unwrap().unwrap_err();
        assert_eq!(err, AuthError::EmailTaken("ada@example.com".into()));
    }

    #[tokio::test]
    async fn invalid_form_never_reaches_the_store() {
        let (inner, mut rx) = create_mock_client::<User>(10);
        let client = UserClient::new(inner, SessionContext::in_memory());

        let mut short = form();
        short.password = "abc".into();
        short.confirm_password = "abc".into();
        assert_eq!(client.sign_up(short).await, Err(AuthError::PasswordTooShort(6)));

        drop(client);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn login_requires_known_email_and_a_password() {
        let (inner, mut rx) = create_mock_client::<User>(10);
        let session = SessionContext::in_memory();
        let client = UserClient::new(inner, session.clone());

        let unknown = {
            let client = client.clone();
            tokio::spawn(async move { client.login("nobody@example.com", "x").await })
        };
        let (_, responder) = expect_list(&mut rx).await.unwrap();
        responder.send(Ok(vec![])).unwrap();
        assert!(matches!(unknown.await.unwrap(), Err(AuthError::NoAccount(_))));

        let known = User {
            id: RecordId::from("3"),
            email: "ada@example.com".into(),
            ..Default::default()
        };
        let blank = {
            let client = client.clone();
            tokio::spawn(async move { client.login("ada@example.com", "").await })
        };
        let (_, responder) = expect_list(&mut rx).await.unwrap();
        responder.send(Ok(vec![known.clone()])).unwrap();
        assert_eq!(blank.await.unwrap(), Err(AuthError::MissingPassword));
        assert!(!session.is_logged_in());

        let ok = tokio::spawn(async move { client.login("ada@example.com", "anything").await });
        let (_, responder) = expect_list(&mut rx).await.unwrap();
        responder.send(Ok(vec![known])).unwrap();
        assert!(ok.await.unwrap().is_ok());
        assert!(session.is_logged_in());
    }

    #[tokio::test]
    async fn unreachable_store_surfaces_as_store_error() {
        let (inner, mut rx) = create_mock_client::<User>(10);
        let client = UserClient::new(inner, SessionContext::in_memory());

        let task = tokio::spawn(async move { client.sign_up(form()).await });
        let (_, responder) = expect_list(&mut rx).await.unwrap();
        responder
            .send(Err(StoreError::Unreachable("connection refused".into())))
            .unwrap();

        let err = task.await.unwrap().unwrap_err();
        assert!(matches!(err, AuthError::Store(StoreError::Unreachable(_))));
    }

    #[tokio::test]
    async fn get_user_looks_up_by_id() {
        let (inner, mut rx) = create_mock_client::<User>(10);
        let client = UserClient::new(inner, SessionContext::in_memory());

        let task = tokio::spawn(async move { client.get_user(RecordId::from("3")).await });
        let (id, responder) = expect_get(&mut rx).await.expect("Expected Get");
        assert_eq!(id, RecordId::from("3"));
        responder
            .send(Ok(Some(User {
                id: RecordId::from("3"),
                email: "ada@example.com".into(),
                ..Default::default()
            })))
            .unwrap();

        let user = task.await.unwrap().unwrap().unwrap();
        assert_eq!(user.email, "ada@example.com");
    }
}
