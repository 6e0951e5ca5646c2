/// A fresh node identifier: 16 random bytes as 32 lowercase hex characters.
pub fn new_node_id() -> String {
    hex::encode(rand::random::<[u8; 16]>())
}
