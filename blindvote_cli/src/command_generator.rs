use blindvote::*;

pub fn command_generator() {
    println!("g: {}", hex::encode(encode(&base_generator())));
    println!("h: {}", hex::encode(encode(&secondary_generator())));
    println!("q: {}", hex::encode(group_order()));
    println!("h domain: {}", H_GENERATOR_DOMAIN);
}
