use std::sync::Arc;

use ethers::prelude::*;

pub type Client = SignerMiddleware<Provider<Http>, LocalWallet>;

#[derive(Debug, Clone)]
pub struct RpcSigner(pub Arc<Client>);
