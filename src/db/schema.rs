//! Database schema and migrations.
//!
//! Migrations are applied in order; the schema_version table records
//! which ones have run.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: users and their email accounts
    r#"
CREATE TABLE users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE COLLATE NOCASE,  -- login name, may be an address
    email       TEXT,
    full_name   TEXT,
    first_name  TEXT,
    user_type   TEXT NOT NULL DEFAULT 'System User',  -- 'System User', 'Website User'
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_users_email ON users(email);

CREATE TABLE email_accounts (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    email_id         TEXT NOT NULL UNIQUE COLLATE NOCASE,
    account_name     TEXT NOT NULL,
    enable_incoming  INTEGER NOT NULL DEFAULT 1,
    enable_outgoing  INTEGER NOT NULL DEFAULT 1,
    password         TEXT NOT NULL,
    imap_server      TEXT NOT NULL,
    smtp_server      TEXT NOT NULL,
    smtp_port        INTEGER NOT NULL DEFAULT 587,
    use_tls          INTEGER NOT NULL DEFAULT 1,
    imap_folder      TEXT NOT NULL DEFAULT 'INBOX',
    created_at       TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE user_emails (
    user_id           INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    email_account_id  INTEGER NOT NULL REFERENCES email_accounts(id) ON DELETE CASCADE,
    created_at        TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (user_id, email_account_id)
);
"#,
    // v2: integration settings singleton
    r#"
CREATE TABLE mailcow_settings (
    id                         INTEGER PRIMARY KEY CHECK (id = 1),
    enabled                    INTEGER NOT NULL DEFAULT 0,
    api_url                    TEXT NOT NULL DEFAULT '',
    api_key                    TEXT NOT NULL DEFAULT '',
    mail_domain                TEXT NOT NULL DEFAULT '',
    default_quota_mb           INTEGER NOT NULL DEFAULT 1024,
    auto_create_email_account  INTEGER NOT NULL DEFAULT 0,
    updated_at                 TEXT NOT NULL DEFAULT (datetime('now'))
);

INSERT INTO mailcow_settings (id) VALUES (1);
"#,
    // v3: user annotations and the error log
    r#"
CREATE TABLE user_comments (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    kind        TEXT NOT NULL DEFAULT 'info',
    content     TEXT NOT NULL,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_user_comments_user_id ON user_comments(user_id);

CREATE TABLE error_log (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT NOT NULL,
    message     TEXT NOT NULL,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);
"#,
];
