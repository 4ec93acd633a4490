pub mod descriptors;
pub mod device;
pub mod packet;
