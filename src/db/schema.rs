use rusqlite::Connection;

/// Initialize the database schema.
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA foreign_keys = ON;

        -- Users (identity + role; password hash never leaves the queries layer)
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL CHECK (role IN ('STAC', 'PROYECTO', 'COMERCIAL', 'SYSTEM')),
            active INTEGER NOT NULL DEFAULT 1,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);

        -- Sessions (opaque bearer tokens stored as SHA-256 digests)
        CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            token_hash TEXT NOT NULL UNIQUE,
            created_at INTEGER NOT NULL,
            expires_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);
        CREATE INDEX IF NOT EXISTS idx_sessions_expiry ON sessions(expires_at);

        -- Clients (license holders)
        CREATE TABLE IF NOT EXISTS clients (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT,
            phone TEXT,
            address TEXT,
            primary_contact TEXT,
            description TEXT,
            system_information_url TEXT,
            created_by TEXT REFERENCES users(id) ON DELETE SET NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_clients_name ON clients(name);

        -- Products (licensable software)
        CREATE TABLE IF NOT EXISTS products (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            description TEXT,
            product_type TEXT,
            active INTEGER NOT NULL DEFAULT 1,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        -- Client-product links (one per pair; vigencias hang off these)
        CREATE TABLE IF NOT EXISTS client_products (
            id TEXT PRIMARY KEY,
            client_id TEXT NOT NULL REFERENCES clients(id) ON DELETE CASCADE,
            product_id TEXT NOT NULL REFERENCES products(id) ON DELETE CASCADE,
            license_quantity INTEGER,
            acquired_at INTEGER,
            notes TEXT,
            created_at INTEGER NOT NULL,
            UNIQUE(client_id, product_id)
        );
        CREATE INDEX IF NOT EXISTS idx_client_products_client ON client_products(client_id);
        CREATE INDEX IF NOT EXISTS idx_client_products_product ON client_products(product_id);

        -- Validity periods (thresholds in days-before-expiration)
        CREATE TABLE IF NOT EXISTS vigencias (
            id TEXT PRIMARY KEY,
            client_product_id TEXT NOT NULL REFERENCES client_products(id) ON DELETE CASCADE,
            starts_at INTEGER NOT NULL,
            expires_at INTEGER NOT NULL,
            period TEXT,
            threshold_green INTEGER NOT NULL,
            threshold_yellow INTEGER NOT NULL,
            threshold_red INTEGER NOT NULL,
            status TEXT NOT NULL CHECK (status IN ('active', 'inactive', 'cancelled')),
            notifications_enabled INTEGER NOT NULL DEFAULT 1,
            notes TEXT,
            created_by TEXT REFERENCES users(id) ON DELETE SET NULL,
            updated_by TEXT REFERENCES users(id) ON DELETE SET NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_vigencias_link ON vigencias(client_product_id);
        CREATE INDEX IF NOT EXISTS idx_vigencias_expiry ON vigencias(expires_at);
        CREATE INDEX IF NOT EXISTS idx_vigencias_status ON vigencias(status);

        -- Notification settings (singleton row; recipients stored as JSON)
        CREATE TABLE IF NOT EXISTS alert_config (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            email_enabled INTEGER NOT NULL,
            email_recipients TEXT NOT NULL,
            teams_enabled INTEGER NOT NULL,
            teams_webhook_url TEXT,
            frequency_critical TEXT NOT NULL CHECK (frequency_critical IN ('daily', 'weekly', 'monthly')),
            frequency_warning TEXT NOT NULL CHECK (frequency_warning IN ('daily', 'weekly', 'monthly')),
            frequency_upcoming TEXT NOT NULL CHECK (frequency_upcoming IN ('daily', 'weekly', 'monthly')),
            updated_by TEXT REFERENCES users(id) ON DELETE SET NULL,
            updated_at INTEGER NOT NULL
        );
        "#,
    )?;
    Ok(())
}
