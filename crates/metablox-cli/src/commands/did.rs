//! `metablox did` — Encode a public key as a DID, or decode a DID.

use clap::{Args, Subcommand};

use metablox_core::ChainName;
use metablox_crypto::multibase;
use metablox_identity::{DidCodec, KeyMaterial};

#[derive(Args, Debug)]
pub struct DidArgs {
    #[command(subcommand)]
    pub command: DidCommand,
}

#[derive(Subcommand, Debug)]
pub enum DidCommand {
    /// Build the DID for a public key on a chain.
    Encode {
        /// Chain name (e.g. solana, ethereum).
        #[arg(long)]
        chain: String,
        /// Multibase public key (`z…` base58btc or `f…` hex).
        #[arg(long)]
        public_key: String,
    },
    /// Show the chain and key material carried by a DID.
    Decode {
        /// DID to decode.
        did: String,
    },
}

pub fn run(args: &DidArgs) -> anyhow::Result<()> {
    match &args.command {
        DidCommand::Encode { chain, public_key } => {
            println!("{}", encode(chain, public_key)?);
        }
        DidCommand::Decode { did } => {
            let (chain, material) = decode(did)?;
            println!("chain:    {}", chain);
            println!("material: {}", material);
        }
    }
    Ok(())
}

fn encode(chain: &str, public_key: &str) -> anyhow::Result<String> {
    let chain = ChainName::new(chain)?;
    let (_, key) = multibase::decode(public_key)?;
    Ok(DidCodec::new().encode(&key, &chain)?.to_string())
}

fn decode(did: &str) -> anyhow::Result<(ChainName, String)> {
    let decoded = DidCodec::new().decode(did)?;
    let material = match &decoded.material {
        KeyMaterial::PublicKey(key) => {
            format!("public key {}", multibase::encode_base58btc(key))
        }
        KeyMaterial::Address(addr) => format!("address {}", multibase::encode(multibase::Base::Base16Lower, addr)),
    };
    Ok((decoded.chain, material))
}
