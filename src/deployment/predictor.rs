use ethers::types::Address;

/// Derives the address a contract created by `deployer` with `nonce` gets
pub trait AddressPredictor {
    fn predict(&self, deployer: Address, nonce: u64) -> Address;
}

/// CREATE derivation, `keccak256(rlp([deployer, nonce]))[12..]`
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateAddressPredictor;

impl AddressPredictor for CreateAddressPredictor {
    fn predict(&self, deployer: Address, nonce: u64) -> Address {
        ethers::utils::get_contract_address(deployer, nonce)
    }
}

pub fn predict_addresses(
    predictor: &impl AddressPredictor,
    deployer: Address,
    start_nonce: u64,
    count: usize,
) -> Vec<Address> {
    (start_nonce..)
        .take(count)
        .map(|nonce| predictor.predict(deployer, nonce))
        .collect()
}
