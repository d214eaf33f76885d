use clap::ValueEnum;
use metashu_core::HashAlgorithm;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum HashFlag {
    Sha256,
    Blake3,
}

impl HashFlag {
    pub(crate) const fn as_domain(self) -> HashAlgorithm {
        match self {
            HashFlag::Sha256 => HashAlgorithm::Sha256,
            HashFlag::Blake3 => HashAlgorithm::Blake3,
        }
    }
}
