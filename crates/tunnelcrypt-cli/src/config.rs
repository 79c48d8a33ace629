//! Configuration system for the tunnelcrypt CLI.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tunnelcrypt_aead::AlgorithmId;
use zeroize::Zeroizing;

/// tunnelcrypt configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Cipher configuration
    #[serde(default)]
    pub cipher: CipherConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Cipher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CipherConfig {
    /// Default cipher for seal/open
    #[serde(default = "default_cipher")]
    pub algorithm: CipherName,
    /// File holding the hex-encoded key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_file: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Cipher names accepted on the command line and in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[value(rename_all = "kebab-case")]
pub enum CipherName {
    /// No cipher
    None,
    /// AES-128-CBC
    Aes128Cbc,
    /// AES-192-CBC
    Aes192Cbc,
    /// AES-256-CBC
    Aes256Cbc,
    /// DES-EDE3-CBC
    DesEde3Cbc,
    /// BF-CBC
    BfCbc,
    /// AES-128-GCM
    Aes128Gcm,
    /// AES-192-GCM
    Aes192Gcm,
    /// AES-256-GCM
    Aes256Gcm,
    /// ChaCha20-Poly1305
    #[serde(rename = "chacha20-poly1305")]
    #[value(name = "chacha20-poly1305")]
    ChaCha20Poly1305,
}

impl From<CipherName> for AlgorithmId {
    fn from(name: CipherName) -> Self {
        match name {
            CipherName::None => AlgorithmId::None,
            CipherName::Aes128Cbc => AlgorithmId::Aes128Cbc,
            CipherName::Aes192Cbc => AlgorithmId::Aes192Cbc,
            CipherName::Aes256Cbc => AlgorithmId::Aes256Cbc,
            CipherName::DesEde3Cbc => AlgorithmId::DesEde3Cbc,
            CipherName::BfCbc => AlgorithmId::BfCbc,
            CipherName::Aes128Gcm => AlgorithmId::Aes128Gcm,
            CipherName::Aes192Gcm => AlgorithmId::Aes192Gcm,
            CipherName::Aes256Gcm => AlgorithmId::Aes256Gcm,
            CipherName::ChaCha20Poly1305 => AlgorithmId::ChaCha20Poly1305,
        }
    }
}

// Default values

fn default_cipher() -> CipherName {
    CipherName::Aes256Gcm
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for CipherConfig {
    fn default() -> Self {
        Self {
            algorithm: default_cipher(),
            key_file: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, contents)?;
        Ok(())
    }

    /// Get default config path
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join("tunnelcrypt/config.toml")
    }

    /// Load config from the default path, falling back to defaults when
    /// no file exists there
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed.
    pub fn load_or_default() -> anyhow::Result<Self> {
        let path = Self::default_path();

        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Configured default algorithm
    #[must_use]
    pub fn algorithm(&self) -> AlgorithmId {
        self.cipher.algorithm.into()
    }

    /// Read the key named by `cipher.key_file`, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not hex.
    pub fn read_key(&self) -> anyhow::Result<Option<Zeroizing<Vec<u8>>>> {
        let Some(path) = &self.cipher.key_file else {
            return Ok(None);
        };
        let contents = Zeroizing::new(fs::read_to_string(path)?);
        let key = hex::decode(contents.trim())
            .map_err(|e| anyhow::anyhow!("Key file {:?} is not valid hex: {}", path, e))?;
        Ok(Some(Zeroizing::new(key)))
    }

    /// Validate configuration
    ///
    /// Only checks settings every command depends on. Cipher and key are
    /// checked per run by [`Config::select_cipher`], after command-line
    /// overrides are applied.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid.
    pub fn validate(&self) -> anyhow::Result<()> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            anyhow::bail!(
                "Invalid log level: {}. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            );
        }

        Ok(())
    }

    /// Effective cipher and key for one seal/open run.
    ///
    /// `algorithm` and `key_hex` come from the command line and take
    /// precedence; the configured cipher and key file are consulted only
    /// for what is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the effective cipher is not an AEAD cipher, if
    /// no key is available, or if the key is too short for the cipher.
    pub fn select_cipher(
        &self,
        algorithm: Option<CipherName>,
        key_hex: Option<&str>,
    ) -> anyhow::Result<(AlgorithmId, Zeroizing<Vec<u8>>)> {
        let algorithm = algorithm.map_or_else(|| self.algorithm(), AlgorithmId::from);
        let Some(required) = algorithm.key_size() else {
            anyhow::bail!("Cipher {} is not an AEAD cipher supported for packet encryption", algorithm);
        };

        let key = match key_hex {
            Some(key_hex) => crate::commands::parse_key(key_hex)?,
            None => self
                .read_key()?
                .ok_or_else(|| anyhow::anyhow!("No key given: pass --key or set cipher.key_file"))?,
        };

        if key.len() < required {
            anyhow::bail!("Key holds {} bytes, {} requires {}", key.len(), algorithm, required);
        }

        Ok((algorithm, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.algorithm(), AlgorithmId::Aes256Gcm);
        assert_eq!(config.logging.level, "info");
        assert!(config.cipher.key_file.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        config.logging.level = "DEBUG".to_string();
        assert!(config.validate().is_ok());

        // Cipher and key are not part of file-level validation
        config.cipher.algorithm = CipherName::BfCbc;
        config.cipher.key_file = Some(PathBuf::from("/nonexistent/key.hex"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.cipher.algorithm, deserialized.cipher.algorithm);
        assert_eq!(config.logging.level, deserialized.logging.level);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[cipher]\nalgorithm = \"chacha20-poly1305\"\n").unwrap();
        assert_eq!(config.algorithm(), AlgorithmId::ChaCha20Poly1305);
        assert_eq!(config.logging.level, "info");

        let empty: Config = toml::from_str("").unwrap();
        assert_eq!(empty.algorithm(), AlgorithmId::Aes256Gcm);
    }

    #[test]
    fn test_select_cipher_from_key_file() {
        let dir = tempfile::tempdir().unwrap();
        let key_path = dir.path().join("key.hex");

        let mut config = Config::default();
        config.cipher.algorithm = CipherName::Aes128Gcm;
        config.cipher.key_file = Some(key_path.clone());

        fs::write(&key_path, "00112233445566778899aabbccddeeff\n").unwrap();
        let (algorithm, key) = config.select_cipher(None, None).unwrap();
        assert_eq!(algorithm, AlgorithmId::Aes128Gcm);
        assert_eq!(key.len(), 16);

        // 16-byte file key is too short once AES-256 is requested
        assert!(config.select_cipher(Some(CipherName::Aes256Gcm), None).is_err());

        fs::write(&key_path, "not hex").unwrap();
        assert!(config.read_key().is_err());
        assert!(config.select_cipher(None, None).is_err());
    }

    #[test]
    fn test_select_cipher_prefers_command_line() {
        let mut config = Config::default();
        config.cipher.algorithm = CipherName::BfCbc;
        config.cipher.key_file = Some(PathBuf::from("/nonexistent/key.hex"));

        let key_hex = "000102030405060708090a0b0c0d0e0f";
        let (algorithm, key) = config
            .select_cipher(Some(CipherName::Aes128Gcm), Some(key_hex))
            .unwrap();
        assert_eq!(algorithm, AlgorithmId::Aes128Gcm);
        assert_eq!(key.as_slice(), hex::decode(key_hex).unwrap().as_slice());

        // Falling back to the configured cipher or key file surfaces their problems
        assert!(config.select_cipher(None, Some(key_hex)).is_err());
        assert!(config.select_cipher(Some(CipherName::Aes128Gcm), None).is_err());
    }

    #[test]
    fn test_select_cipher_rejects_short_key_and_missing_key() {
        let config = Config::default();
        assert!(config.select_cipher(Some(CipherName::ChaCha20Poly1305), Some("00ff")).is_err());

        let err = config.select_cipher(None, None).unwrap_err();
        assert!(err.to_string().contains("No key given"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");

        let mut config = Config::default();
        config.cipher.algorithm = CipherName::Aes192Gcm;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.algorithm(), AlgorithmId::Aes192Gcm);
    }
}
