//! An in-process identity service for local development and tests.
//!
//! [`InMemoryIdentity`] behaves like the hosted service as far as the
//! session layer can tell: it uses the same error codes, signs a new
//! account in on creation, does not notify on profile updates, and fires
//! each listener once right after it registers.
//!
//! Two delivery modes:
//! - [`InMemoryIdentity::new`] delivers notifications immediately.
//! - [`InMemoryIdentity::deferred`] queues them until
//!   [`flush_notifications`](InMemoryIdentity::flush_notifications), which
//!   models the real service's asynchronous callbacks.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use legaliq_types::{SignInMethod, User, UserCredential, UserId};
use rand::Rng;
use rand::distr::Alphanumeric;

use crate::{
    AuthListener, FederatedProvider, IdentityService, ProfileUpdate,
    ProviderError, Subscription,
};

/// Minimum password length the service accepts, matching the hosted one.
const MIN_PASSWORD_LEN: usize = 6;

/// Identity calls that can have a failure injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentityCall {
    CreateAccount,
    UpdateProfile,
    SignIn,
    SignInWithPopup,
    SignOut,
}

/// What the next federated popup does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupOutcome {
    /// The user closes the popup.
    Closed,

    /// The browser blocks the popup.
    Blocked,

    /// The user completes the flow as this account.
    Complete(User),
}

/// A stored password account.
#[derive(Debug, Clone)]
struct Account {
    password: Option<String>,
    user: User,
}

/// Who a queued notification is for.
#[derive(Debug, Clone, Copy)]
enum Target {
    All,
    Listener(u64),
}

#[derive(Debug, Clone)]
struct Notification {
    target: Target,
    user: Option<User>,
}

struct Inner {
    /// Accounts keyed by email.
    accounts: HashMap<String, Account>,
    current: Option<User>,
    listeners: BTreeMap<u64, AuthListener>,
    next_listener: u64,
    deliver_immediately: bool,
    pending: VecDeque<Notification>,
    failures: HashMap<IdentityCall, VecDeque<ProviderError>>,
    popup: PopupOutcome,
}

/// An [`IdentityService`] that keeps everything in memory.
///
/// Cheap to share: wrap it in an `Arc` and hand clones to the provider and
/// the test.
pub struct InMemoryIdentity {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryIdentity {
    /// A service that delivers notifications as soon as state changes.
    pub fn new() -> Self {
        Self::with_delivery(true)
    }

    /// A service that queues notifications until
    /// [`flush_notifications`](Self::flush_notifications).
    pub fn deferred() -> Self {
        Self::with_delivery(false)
    }

    fn with_delivery(deliver_immediately: bool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                accounts: HashMap::new(),
                current: None,
                listeners: BTreeMap::new(),
                next_listener: 0,
                deliver_immediately,
                pending: VecDeque::new(),
                failures: HashMap::new(),
                popup: PopupOutcome::Closed,
            })),
        }
    }

    // -- Test and dev controls --------------------------------------------

    /// Creates a password account without signing it in.
    pub fn register(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> User {
        let mut user = User::new(generate_uid()).with_email(email);
        user.display_name = display_name.map(str::to_string);
        self.lock().accounts.insert(
            email.to_string(),
            Account {
                password: Some(password.to_string()),
                user: user.clone(),
            },
        );
        user
    }

    /// `true` when an account with this email exists.
    pub fn has_account(&self, email: &str) -> bool {
        self.lock().accounts.contains_key(email)
    }

    /// Makes the next call of `call` fail with `err`.
    pub fn fail_next(&self, call: IdentityCall, err: ProviderError) {
        self.lock().failures.entry(call).or_default().push_back(err);
    }

    /// Sets what every following popup flow does.
    pub fn set_popup_outcome(&self, outcome: PopupOutcome) {
        self.lock().popup = outcome;
    }

    /// Shorthand for `set_popup_outcome(PopupOutcome::Complete(user))`.
    pub fn complete_popup_as(&self, user: User) {
        self.set_popup_outcome(PopupOutcome::Complete(user));
    }

    /// Forces a notification to every listener, as if the service's
    /// session changed to `user`.
    pub fn emit(&self, user: Option<User>) {
        let mut inner = self.lock();
        inner.current = user.clone();
        self.enqueue(inner, Target::All, user);
    }

    /// Delivers all queued notifications. Returns how many listener calls
    /// were made.
    pub fn flush_notifications(&self) -> usize {
        let batch = {
            let mut inner = self.lock();
            let pending: Vec<Notification> = inner.pending.drain(..).collect();
            let batch: Vec<(AuthListener, Option<User>)> = pending
                .into_iter()
                .flat_map(|n| inner.resolve(n))
                .collect();
            batch
        };
        let delivered = batch.len();
        for (listener, user) in batch {
            listener(user);
        }
        delivered
    }

    /// Notifications waiting for [`flush_notifications`](Self::flush_notifications).
    pub fn pending_notifications(&self) -> usize {
        self.lock().pending.len()
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    // -- Internals --------------------------------------------------------

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn take_failure(&self, call: IdentityCall) -> Result<(), ProviderError> {
        match self
            .lock()
            .failures
            .get_mut(&call)
            .and_then(VecDeque::pop_front)
        {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Queues a notification, or delivers it right away in immediate mode.
    ///
    /// Takes the guard by value so the lock is released before any
    /// listener runs.
    fn enqueue(
        &self,
        mut inner: MutexGuard<'_, Inner>,
        target: Target,
        user: Option<User>,
    ) {
        let notification = Notification { target, user };
        if !inner.deliver_immediately {
            inner.pending.push_back(notification);
            return;
        }
        let batch = inner.resolve(notification);
        drop(inner);
        for (listener, user) in batch {
            listener(user);
        }
    }

    /// Signs `user` in and notifies.
    fn sign_in_as(&self, mut inner: MutexGuard<'_, Inner>, user: User) {
        inner.current = Some(user.clone());
        self.enqueue(inner, Target::All, Some(user));
    }
}

impl Inner {
    /// Pairs a notification with the listeners it should reach right now.
    /// Listeners removed since it was queued are skipped, and the user is
    /// the account as it stands at delivery, not as it was when queued.
    fn resolve(&self, n: Notification) -> Vec<(AuthListener, Option<User>)> {
        let user = n.user.map(|user| self.latest(user));
        match n.target {
            Target::All => self
                .listeners
                .values()
                .map(|l| (Arc::clone(l), user.clone()))
                .collect(),
            Target::Listener(id) => self
                .listeners
                .get(&id)
                .map(|l| vec![(Arc::clone(l), user)])
                .unwrap_or_default(),
        }
    }

    /// The stored account with the same uid, or `user` if there is none.
    fn latest(&self, user: User) -> User {
        self.accounts
            .values()
            .find(|a| a.user.uid == user.uid)
            .map(|a| a.user.clone())
            .unwrap_or(user)
    }
}

impl Default for InMemoryIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityService for InMemoryIdentity {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserCredential, ProviderError> {
        self.take_failure(IdentityCall::CreateAccount)?;

        if !is_plausible_email(email) {
            return Err(ProviderError::new(
                "auth/invalid-email",
                "The email address is badly formatted.",
            ));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ProviderError::new(
                "auth/weak-password",
                "Password should be at least 6 characters.",
            ));
        }

        let mut inner = self.lock();
        if inner.accounts.contains_key(email) {
            return Err(ProviderError::new(
                "auth/email-already-in-use",
                "The email address is already in use by another account.",
            ));
        }

        let user = User::new(generate_uid()).with_email(email);
        inner.accounts.insert(
            email.to_string(),
            Account {
                password: Some(password.to_string()),
                user: user.clone(),
            },
        );
        self.sign_in_as(inner, user.clone());

        Ok(UserCredential {
            user,
            method: SignInMethod::Password,
            is_new_user: true,
        })
    }

    async fn update_profile(
        &self,
        uid: &UserId,
        update: ProfileUpdate,
    ) -> Result<(), ProviderError> {
        self.take_failure(IdentityCall::UpdateProfile)?;

        let mut inner = self.lock();
        let account = inner
            .accounts
            .values_mut()
            .find(|a| &a.user.uid == uid)
            .ok_or_else(|| {
                ProviderError::new("auth/user-not-found", "No such account.")
            })?;

        if let Some(name) = update.display_name {
            account.user.display_name = Some(name);
        }
        let updated = account.user.clone();

        // Profile changes show up in the current-user snapshot, but no
        // notification fires.
        if inner.current.as_ref().is_some_and(|u| &u.uid == uid) {
            inner.current = Some(updated);
        }
        Ok(())
    }

    async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserCredential, ProviderError> {
        self.take_failure(IdentityCall::SignIn)?;

        let inner = self.lock();
        let account = inner.accounts.get(email).ok_or_else(|| {
            ProviderError::new(
                "auth/user-not-found",
                "There is no user record for this email.",
            )
        })?;
        if account.password.as_deref() != Some(password) {
            return Err(ProviderError::new(
                "auth/wrong-password",
                "The password is invalid.",
            ));
        }

        let user = account.user.clone();
        self.sign_in_as(inner, user.clone());

        Ok(UserCredential {
            user,
            method: SignInMethod::Password,
            is_new_user: false,
        })
    }

    async fn sign_in_with_popup(
        &self,
        provider: FederatedProvider,
    ) -> Result<UserCredential, ProviderError> {
        self.take_failure(IdentityCall::SignInWithPopup)?;

        let mut inner = self.lock();
        let user = match inner.popup.clone() {
            PopupOutcome::Closed => {
                return Err(ProviderError::new(
                    "auth/popup-closed-by-user",
                    "The popup has been closed by the user.",
                ));
            }
            PopupOutcome::Blocked => {
                return Err(ProviderError::new(
                    "auth/popup-blocked",
                    "Unable to establish a connection with the popup.",
                ));
            }
            PopupOutcome::Complete(user) => user,
        };

        let key = user
            .email
            .clone()
            .unwrap_or_else(|| format!("{}@{}", user.uid, provider.provider_id()));
        let is_new_user = !inner.accounts.contains_key(&key);
        if is_new_user {
            inner.accounts.insert(
                key,
                Account {
                    password: None,
                    user: user.clone(),
                },
            );
        }
        self.sign_in_as(inner, user.clone());

        let method = match provider {
            FederatedProvider::Google => SignInMethod::Google,
        };
        Ok(UserCredential {
            user,
            method,
            is_new_user,
        })
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.take_failure(IdentityCall::SignOut)?;

        let mut inner = self.lock();
        inner.current = None;
        self.enqueue(inner, Target::All, None);
        Ok(())
    }

    fn on_auth_state_changed(&self, listener: AuthListener) -> Subscription {
        let mut inner = self.lock();
        let id = inner.next_listener;
        inner.next_listener += 1;
        inner.listeners.insert(id, listener);

        // Like the hosted service: the new listener hears the current
        // state once, and only the new listener.
        let current = inner.current.clone();
        self.enqueue(inner, Target::Listener(id), current);

        let registry: Weak<Mutex<Inner>> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .listeners
                    .remove(&id);
            }
        })
    }

    fn current_user(&self) -> Option<User> {
        self.lock().current.clone()
    }
}

/// Generates a 28-character alphanumeric account id, the same shape the
/// hosted service uses.
fn generate_uid() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(28)
        .map(char::from)
        .collect()
}

/// A deliberately loose check: something before and after a single `@`,
/// and a dot in the domain.
fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}
