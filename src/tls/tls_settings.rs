use crate::ConfigurationError;
use crate::constants::{DEFAULT_CLIENT_TLS_PROTOCOL, DEFAULT_SERVER_TLS_PROTOCOL};
use pkcs8::{Document, EncryptedPrivateKeyInfo};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::server::WebPkiClientVerifier;
use rustls::{ClientConfig, RootCertStore, ServerConfig, SupportedProtocolVersion};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

static TLS12_ONLY: [&SupportedProtocolVersion; 1] = [&rustls::version::TLS12];
static TLS13_ONLY: [&SupportedProtocolVersion; 1] = [&rustls::version::TLS13];

/// Protocol versions a side is willing to negotiate.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TlsProtocol {
    /// Any version rustls supports.
    Any,
    Tls12,
    Tls13,
}

impl TlsProtocol {
    pub fn versions(self) -> &'static [&'static SupportedProtocolVersion] {
        match self {
            TlsProtocol::Any => rustls::ALL_VERSIONS,
            TlsProtocol::Tls12 => &TLS12_ONLY,
            TlsProtocol::Tls13 => &TLS13_ONLY,
        }
    }
}

impl FromStr for TlsProtocol {
    type Err = ConfigurationError;

    /// Accepts `TLS`, `TLSv1.2` and `TLSv1.3`, ignoring case.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_uppercase().as_str() {
            "TLS" => Ok(TlsProtocol::Any),
            "TLSV1.2" => Ok(TlsProtocol::Tls12),
            "TLSV1.3" => Ok(TlsProtocol::Tls13),
            _ => Err(ConfigurationError::UnknownTlsProtocol(name.to_owned())),
        }
    }
}

/// Encoding of certificate and key files.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum StoreFormat {
    #[default]
    Pem,
    /// A single DER-encoded item per file.
    Der,
}

/// This side's certificate chain and private key.
#[derive(Debug)]
pub enum KeyMaterial {
    Files {
        certificate_chain: PathBuf,
        private_key: PathBuf,
        format: StoreFormat,
        /// With a passphrase the key file must hold an encrypted PKCS#8 key
        /// (`ENCRYPTED PRIVATE KEY` in PEM).
        passphrase: Option<String>,
    },
    InMemory {
        certificate_chain: Vec<CertificateDer<'static>>,
        private_key: PrivateKeyDer<'static>,
    },
}

impl KeyMaterial {
    /// Unencrypted key material read from files.
    pub fn files(
        certificate_chain: impl Into<PathBuf>,
        private_key: impl Into<PathBuf>,
        format: StoreFormat,
    ) -> Self {
        KeyMaterial::Files {
            certificate_chain: certificate_chain.into(),
            private_key: private_key.into(),
            format,
            passphrase: None,
        }
    }

    /// Key material whose private key file is encrypted with `passphrase`.
    pub fn encrypted_files(
        certificate_chain: impl Into<PathBuf>,
        private_key: impl Into<PathBuf>,
        format: StoreFormat,
        passphrase: impl Into<String>,
    ) -> Self {
        KeyMaterial::Files {
            certificate_chain: certificate_chain.into(),
            private_key: private_key.into(),
            format,
            passphrase: Some(passphrase.into()),
        }
    }

    fn load(&self) -> Result<(Vec<CertificateDer<'static>>, PrivateKeyDer<'static>), ConfigurationError> {
        match self {
            KeyMaterial::Files {
                certificate_chain,
                private_key,
                format,
                passphrase,
            } => {
                let key = match passphrase {
                    Some(passphrase) => load_encrypted_private_key(private_key, *format, passphrase)?,
                    None => load_private_key(private_key, *format)?,
                };
                Ok((load_certificates(certificate_chain, *format)?, key))
            }
            KeyMaterial::InMemory {
                certificate_chain,
                private_key,
            } => Ok((certificate_chain.clone(), private_key.clone_key())),
        }
    }
}

/// Certificates used to verify the peer.
#[derive(Debug, Clone)]
pub enum TrustMaterial {
    Files { path: PathBuf, format: StoreFormat },
    InMemory(Vec<CertificateDer<'static>>),
}

impl TrustMaterial {
    fn root_store(&self) -> Result<RootCertStore, ConfigurationError> {
        let certificates = match self {
            TrustMaterial::Files { path, format } => load_certificates(path, *format)?,
            TrustMaterial::InMemory(certificates) => certificates.clone(),
        };

        let mut roots = RootCertStore::empty();
        for certificate in certificates {
            roots.add(certificate)?;
        }
        Ok(roots)
    }
}

/// TLS configuration shared by connectors and clients.
#[derive(Debug)]
pub struct TlsSettings {
    /// `TLS`, `TLSv1.2` or `TLSv1.3`.
    pub protocol: String,
    pub key_material: Option<KeyMaterial>,
    pub trust_material: Option<TrustMaterial>,
    /// Servers only: reject clients that present no trusted certificate.
    pub require_client_certificate: bool,
    /// Clients only: name to verify the server certificate against. Defaults
    /// to the host the client connects to.
    pub server_name: Option<String>,
}

impl TlsSettings {
    pub fn server(key_material: KeyMaterial) -> Self {
        Self {
            protocol: DEFAULT_SERVER_TLS_PROTOCOL.to_owned(),
            key_material: Some(key_material),
            trust_material: None,
            require_client_certificate: false,
            server_name: None,
        }
    }

    pub fn client(trust_material: TrustMaterial) -> Self {
        Self {
            protocol: DEFAULT_CLIENT_TLS_PROTOCOL.to_owned(),
            key_material: None,
            trust_material: Some(trust_material),
            require_client_certificate: false,
            server_name: None,
        }
    }

    pub fn protocol(&self) -> Result<TlsProtocol, ConfigurationError> {
        self.protocol.parse()
    }

    pub fn build_server_config(&self) -> Result<Arc<ServerConfig>, ConfigurationError> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let (chain, key) = self
            .key_material
            .as_ref()
            .ok_or_else(|| ConfigurationError::TlsMaterial("a server needs key material".into()))?
            .load()?;

        let builder = ServerConfig::builder_with_provider(provider.clone())
            .with_protocol_versions(self.protocol()?.versions())?;

        let config = if self.require_client_certificate {
            let roots = self.trust_root_store()?;
            let verifier = WebPkiClientVerifier::builder_with_provider(Arc::new(roots), provider)
                .build()
                .map_err(|err| ConfigurationError::TlsMaterial(err.to_string()))?;
            builder
                .with_client_cert_verifier(verifier)
                .with_single_cert(chain, key)?
        } else {
            builder.with_no_client_auth().with_single_cert(chain, key)?
        };

        Ok(Arc::new(config))
    }

    pub fn build_client_config(&self) -> Result<Arc<ClientConfig>, ConfigurationError> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let roots = self.trust_root_store()?;

        let builder = ClientConfig::builder_with_provider(provider)
            .with_protocol_versions(self.protocol()?.versions())?
            .with_root_certificates(roots);

        let config = match &self.key_material {
            Some(material) => {
                let (chain, key) = material.load()?;
                builder.with_client_auth_cert(chain, key)?
            }
            None => builder.with_no_client_auth(),
        };

        Ok(Arc::new(config))
    }

    fn trust_root_store(&self) -> Result<RootCertStore, ConfigurationError> {
        self.trust_material
            .as_ref()
            .ok_or_else(|| ConfigurationError::TlsMaterial("no trust material configured".into()))?
            .root_store()
    }
}

fn open(path: &Path) -> Result<BufReader<File>, ConfigurationError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| ConfigurationError::TlsMaterialIo {
            path: path.to_owned(),
            source,
        })
}

fn read_all(path: &Path) -> Result<Vec<u8>, ConfigurationError> {
    let mut bytes = Vec::new();
    open(path)?
        .read_to_end(&mut bytes)
        .map_err(|source| ConfigurationError::TlsMaterialIo {
            path: path.to_owned(),
            source,
        })?;
    Ok(bytes)
}

fn load_certificates(
    path: &Path,
    format: StoreFormat,
) -> Result<Vec<CertificateDer<'static>>, ConfigurationError> {
    let certificates = match format {
        StoreFormat::Pem => rustls_pemfile::certs(&mut open(path)?)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| ConfigurationError::TlsMaterialIo {
                path: path.to_owned(),
                source,
            })?,
        StoreFormat::Der => vec![CertificateDer::from(read_all(path)?)],
    };

    if certificates.is_empty() {
        return Err(ConfigurationError::TlsMaterial(format!(
            "no certificate found in {}",
            path.display()
        )));
    }
    Ok(certificates)
}

fn load_private_key(
    path: &Path,
    format: StoreFormat,
) -> Result<PrivateKeyDer<'static>, ConfigurationError> {
    match format {
        StoreFormat::Pem => rustls_pemfile::private_key(&mut open(path)?)
            .map_err(|source| ConfigurationError::TlsMaterialIo {
                path: path.to_owned(),
                source,
            })?
            .ok_or_else(|| {
                ConfigurationError::TlsMaterial(format!(
                    "no private key found in {}",
                    path.display()
                ))
            }),
        StoreFormat::Der => PrivateKeyDer::try_from(read_all(path)?)
            .map_err(|err| ConfigurationError::TlsMaterial(err.to_string())),
    }
}

const ENCRYPTED_KEY_LABEL: &str = "ENCRYPTED PRIVATE KEY";

fn load_encrypted_private_key(
    path: &Path,
    format: StoreFormat,
    passphrase: &str,
) -> Result<PrivateKeyDer<'static>, ConfigurationError> {
    let unreadable = |err: &dyn std::fmt::Display| {
        ConfigurationError::TlsMaterial(format!(
            "cannot read the encrypted key in {}: {err}",
            path.display()
        ))
    };

    let bytes = read_all(path)?;
    let der = match format {
        StoreFormat::Pem => {
            let pem = std::str::from_utf8(&bytes).map_err(|err| unreadable(&err))?;
            let (label, document) = Document::from_pem(pem).map_err(|err| unreadable(&err))?;
            if label != ENCRYPTED_KEY_LABEL {
                return Err(ConfigurationError::TlsMaterial(format!(
                    "expected {ENCRYPTED_KEY_LABEL} in {}, found {label}",
                    path.display()
                )));
            }
            document.as_bytes().to_vec()
        }
        StoreFormat::Der => bytes,
    };

    let info = EncryptedPrivateKeyInfo::try_from(der.as_slice()).map_err(|err| unreadable(&err))?;
    let key = info.decrypt(passphrase).map_err(|err| {
        ConfigurationError::TlsMaterial(format!(
            "cannot decrypt the private key in {}: {err}",
            path.display()
        ))
    })?;

    Ok(PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(
        key.as_bytes().to_vec(),
    )))
}
