pub mod bias;
