mod adjoint;
mod derivatives;
mod identities;
