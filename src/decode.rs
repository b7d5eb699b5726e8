pub(crate) mod module;
pub(crate) mod solid;
pub(crate) mod worker;
